//! Raw input and output records.

use std::fmt;

/// One of the two operations of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// First dose, duration `p1`.
    First,
    /// Second dose, duration `p2`.
    Second,
}

impl Operation {
    /// Both operations in processing order.
    pub const ALL: [Operation; 2] = [Operation::First, Operation::Second];

    /// Position of this operation (0 or 1).
    pub fn index(self) -> usize {
        match self {
            Operation::First => 0,
            Operation::Second => 1,
        }
    }

    /// Processing time of this operation under `params`.
    pub fn duration(self, params: &Params) -> i64 {
        match self {
            Operation::First => params.p1,
            Operation::Second => params.p2,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::First => write!(f, "dose 1"),
            Operation::Second => write!(f, "dose 2"),
        }
    }
}

/// Instance-wide constants shared by every job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// Processing time of the first dose.
    pub p1: i64,
    /// Processing time of the second dose.
    pub p2: i64,
    /// Minimum delay between the end of dose 1 and the start of dose 2.
    pub gap: i64,
}

impl Params {
    pub fn new(p1: i64, p2: i64, gap: i64) -> Self {
        Self { p1, p2, gap }
    }
}

/// A patient: the per-job tuple `(r, d, x, l)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    /// `r`: earliest start of dose 1.
    pub release: i64,
    /// `d`: last timeslot in which dose 1 may still be processed.
    pub deadline: i64,
    /// `x`: job-specific delay on top of the gap.
    pub slack: i64,
    /// `l`: length of the dose-2 window.
    pub second_window: i64,
}

impl Job {
    pub fn new(release: i64, deadline: i64, slack: i64, second_window: i64) -> Self {
        Self {
            release,
            deadline,
            slack,
            second_window,
        }
    }
}

/// A full problem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    pub params: Params,
    pub jobs: Vec<Job>,
}

impl Instance {
    pub fn new(params: Params, jobs: Vec<Job>) -> Self {
        Self { params, jobs }
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the instance has no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Start times and machines of one job: `(T, M1, S, M2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// `T`: start of dose 1.
    pub first_start: i64,
    /// `M1`: machine of dose 1 (1-based).
    pub first_machine: usize,
    /// `S`: start of dose 2.
    pub second_start: i64,
    /// `M2`: machine of dose 2 (1-based).
    pub second_machine: usize,
}

impl Assignment {
    pub fn new(first_start: i64, first_machine: usize, second_start: i64, second_machine: usize) -> Self {
        Self {
            first_start,
            first_machine,
            second_start,
            second_machine,
        }
    }

    /// Start of the given operation.
    pub fn start(&self, op: Operation) -> i64 {
        match op {
            Operation::First => self.first_start,
            Operation::Second => self.second_start,
        }
    }

    /// Machine of the given operation.
    pub fn machine(&self, op: Operation) -> usize {
        match op {
            Operation::First => self.first_machine,
            Operation::Second => self.second_machine,
        }
    }
}

/// A complete schedule: one assignment per job in input order plus the
/// machine count `M`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    pub assignments: Vec<Assignment>,
    pub machines: usize,
}

impl Solution {
    pub fn new(assignments: Vec<Assignment>, machines: usize) -> Self {
        Self {
            assignments,
            machines,
        }
    }

    /// Number of distinct machine indices actually referenced.
    pub fn distinct_machines(&self) -> usize {
        let mut seen: Vec<usize> = self
            .assignments
            .iter()
            .flat_map(|a| [a.first_machine, a.second_machine])
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_duration() {
        let params = Params::new(3, 2, 5);
        assert_eq!(Operation::First.duration(&params), 3);
        assert_eq!(Operation::Second.duration(&params), 2);
        assert_eq!(Operation::Second.index(), 1);
    }

    #[test]
    fn test_distinct_machines() {
        let solution = Solution::new(
            vec![Assignment::new(1, 1, 4, 2), Assignment::new(2, 2, 6, 2)],
            2,
        );
        assert_eq!(solution.distinct_machines(), 2);
        assert_eq!(solution.assignments[0].start(Operation::Second), 4);
        assert_eq!(solution.assignments[1].machine(Operation::First), 2);
    }
}
