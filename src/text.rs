//! Line-oriented text formats.
//!
//! Instance:
//!
//! ```text
//! p1
//! p2
//! gap
//! jobCount
//! r, d, x, l      (jobCount lines)
//! ```
//!
//! Solution: one `T, M1, S, M2` line per job in input order, then one line
//! holding the machine count `M`, or `-` (also accepted: `-1`) when no
//! schedule was found. Blank lines are skipped everywhere and fields may be
//! padded with whitespace.

use crate::adapter::Outcome;
use crate::error::ParseError;
use crate::instance::{Assignment, Instance, Job, Params, Solution};
use std::fmt::Write;

/// Written in place of `M` when there is no schedule.
pub const NO_SOLUTION: &str = "-";

/// A solution file as read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedSolution {
    pub assignments: Vec<Assignment>,
    /// `None` when the file carries the no-solution sentinel.
    pub machines: Option<usize>,
}

impl ReportedSolution {
    /// The schedule, unless the sentinel was reported.
    pub fn into_solution(self) -> Option<Solution> {
        self.machines
            .map(|machines| Solution::new(self.assignments, machines))
    }
}

/// Non-blank lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn integer(line: usize, value: &str) -> Result<i64, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidInteger {
        line,
        value: value.trim().to_string(),
    })
}

fn non_negative(line: usize, what: &'static str, value: &str) -> Result<usize, ParseError> {
    let value = integer(line, value)?;
    usize::try_from(value).map_err(|_| ParseError::Negative { line, what, value })
}

fn fields<const N: usize>(line: usize, text: &str) -> Result<[i64; N], ParseError> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != N {
        return Err(ParseError::FieldCount {
            line,
            expected: N,
            found: parts.len(),
        });
    }
    let mut values = [0; N];
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = integer(line, part)?;
    }
    Ok(values)
}

/// Parses an instance.
///
/// Lines after the last job are ignored. Job values are not checked here;
/// [`Instance::validate`] reports unschedulable jobs.
///
/// # Examples
///
/// ```
/// use u_doseplan::text::parse_instance;
///
/// let instance = parse_instance("2\n1\n0\n1\n1, 2, 0, 1\n").unwrap();
/// assert_eq!(instance.params.p1, 2);
/// assert_eq!(instance.jobs[0].deadline, 2);
/// ```
pub fn parse_instance(text: &str) -> Result<Instance, ParseError> {
    let mut lines = content_lines(text);
    let mut header = |expected: &'static str| {
        lines.next().ok_or(ParseError::MissingLine {
            line: text.lines().count() + 1,
            expected,
        })
    };

    let (line, p1) = header("p1")?;
    let p1 = integer(line, p1)?;
    let (line, p2) = header("p2")?;
    let p2 = integer(line, p2)?;
    let (line, gap) = header("gap")?;
    let gap = integer(line, gap)?;
    let (line, count) = header("job count")?;
    let count = non_negative(line, "job count", count)?;

    let mut jobs = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let (line, text) = header("job line `r, d, x, l`")?;
        let [r, d, x, l] = fields::<4>(line, text)?;
        jobs.push(Job::new(r, d, x, l));
    }
    Ok(Instance::new(Params::new(p1, p2, gap), jobs))
}

/// Writes an instance in the format [`parse_instance`] reads.
pub fn format_instance(instance: &Instance) -> String {
    let mut out = String::new();
    let p = &instance.params;
    let _ = writeln!(out, "{}\n{}\n{}\n{}", p.p1, p.p2, p.gap, instance.jobs.len());
    for job in &instance.jobs {
        let _ = writeln!(
            out,
            "{}, {}, {}, {}",
            job.release, job.deadline, job.slack, job.second_window
        );
    }
    out
}

/// Parses a solution file.
///
/// The last non-blank line is the machine count or the sentinel; every
/// line before it is an assignment.
///
/// # Examples
///
/// ```
/// use u_doseplan::text::parse_solution;
///
/// let reported = parse_solution("1, 1, 2, 1\n1\n").unwrap();
/// assert_eq!(reported.machines, Some(1));
///
/// let none = parse_solution("-1\n").unwrap();
/// assert_eq!(none.machines, None);
/// ```
pub fn parse_solution(text: &str) -> Result<ReportedSolution, ParseError> {
    let lines: Vec<(usize, &str)> = content_lines(text).collect();
    let Some((&(m_line, m_text), body)) = lines.split_last() else {
        return Err(ParseError::MissingLine {
            line: 1,
            expected: "machine count",
        });
    };

    let machines = match m_text {
        NO_SOLUTION | "-1" => None,
        other => Some(non_negative(m_line, "machine count", other)?),
    };

    let mut assignments = Vec::with_capacity(body.len());
    for &(line, text) in body {
        let [t, m1, s, m2] = fields::<4>(line, text)?;
        let machine = |value: i64| {
            usize::try_from(value).map_err(|_| ParseError::Negative {
                line,
                what: "machine",
                value,
            })
        };
        assignments.push(Assignment::new(t, machine(m1)?, s, machine(m2)?));
    }
    Ok(ReportedSolution {
        assignments,
        machines,
    })
}

/// Writes a solution: assignments, then `M`.
pub fn format_solution(solution: &Solution) -> String {
    let mut out = String::new();
    for a in &solution.assignments {
        let _ = writeln!(
            out,
            "{}, {}, {}, {}",
            a.first_start, a.first_machine, a.second_start, a.second_machine
        );
    }
    let _ = writeln!(out, "{}", solution.machines);
    out
}

/// Writes an outcome: its solution, or only the sentinel line.
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome.solution() {
        Some(solution) => format_solution(solution),
        None => format!("{NO_SOLUTION}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instance_with_padding() {
        let text = "  2 \n1\n\n3\n2\n 1 ,2,  0, 1\n4, 9, 2, 3  \n";
        let instance = parse_instance(text).unwrap();
        assert_eq!(instance.params, Params::new(2, 1, 3));
        assert_eq!(instance.jobs, vec![Job::new(1, 2, 0, 1), Job::new(4, 9, 2, 3)]);
    }

    #[test]
    fn test_zero_jobs() {
        let instance = parse_instance("1\n1\n0\n0\n").unwrap();
        assert!(instance.is_empty());
    }

    #[test]
    fn test_format_instance_reparses() {
        let instance = Instance::new(
            Params::new(3, 2, 5),
            vec![Job::new(1, 3, 0, 2), Job::new(7, 12, 4, 6)],
        );
        let text = format_instance(&instance);
        assert!(text.starts_with("3\n2\n5\n2\n1, 3, 0, 2\n"));
        assert_eq!(parse_instance(&text).unwrap(), instance);
    }

    #[test]
    fn test_instance_errors() {
        assert_eq!(
            parse_instance("1\n1\n"),
            Err(ParseError::MissingLine {
                line: 3,
                expected: "gap",
            })
        );
        assert!(matches!(
            parse_instance("1\nx\n0\n0\n"),
            Err(ParseError::InvalidInteger { line: 2, .. })
        ));
        assert!(matches!(
            parse_instance("1\n1\n0\n-2\n"),
            Err(ParseError::Negative { line: 4, value: -2, .. })
        ));
        assert_eq!(
            parse_instance("1\n1\n0\n1\n1, 2, 3\n"),
            Err(ParseError::FieldCount {
                line: 5,
                expected: 4,
                found: 3,
            })
        );
        assert!(matches!(
            parse_instance("1\n1\n0\n2\n1, 1, 0, 1\n"),
            Err(ParseError::MissingLine { .. })
        ));
    }

    #[test]
    fn test_parse_solution() {
        let reported = parse_solution("1, 1, 3, 1\n1, 2, 3, 2\n\n2\n").unwrap();
        assert_eq!(reported.machines, Some(2));
        assert_eq!(reported.assignments[1], Assignment::new(1, 2, 3, 2));
        assert_eq!(reported.into_solution().map(|s| s.machines), Some(2));
    }

    #[test]
    fn test_sentinel_is_not_a_count() {
        for sentinel in ["-", "-1", "  -  "] {
            let reported = parse_solution(&format!("{sentinel}\n")).unwrap();
            assert_eq!(reported.machines, None);
            assert!(reported.into_solution().is_none());
        }
        assert!(matches!(
            parse_solution("-2\n"),
            Err(ParseError::Negative { value: -2, .. })
        ));
        assert!(matches!(
            parse_solution(""),
            Err(ParseError::MissingLine { .. })
        ));
    }

    #[test]
    fn test_negative_machine_rejected() {
        assert!(matches!(
            parse_solution("1, -1, 2, 1\n1\n"),
            Err(ParseError::Negative { line: 1, what: "machine", .. })
        ));
    }

    #[test]
    fn test_format_outcome() {
        let solution = Solution::new(vec![Assignment::new(1, 1, 2, 1)], 1);
        assert_eq!(format_solution(&solution), "1, 1, 2, 1\n1\n");
        assert_eq!(format_outcome(&Outcome::Optimal(solution)), "1, 1, 2, 1\n1\n");
        assert_eq!(format_outcome(&Outcome::Infeasible), "-\n");
        assert_eq!(parse_solution(&format_outcome(&Outcome::TimedOut)).unwrap().machines, None);
    }
}
