//! Verification findings.

use crate::instance::Operation;
use std::fmt;

/// One inconsistency found in a candidate schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Finding {
    /// A job's starts violate its own constraints.
    RangeInconsistency {
        job: usize,
        /// `r <= T <= d - p1 + 1` failed.
        first_dose: bool,
        /// `T + p1 + gap + x <= S <= T + p1 + gap + x + l - p2` failed.
        second_dose: bool,
    },

    /// Two operations occupy the same machine during timeslot `time`.
    ///
    /// `job_a`/`dose_a` is the operation that started first.
    DoubleBooking {
        machine: usize,
        time: i64,
        job_a: usize,
        dose_a: Operation,
        job_b: usize,
        dose_b: Operation,
    },

    /// An operation is on machine 0; machines are numbered from 1.
    InvalidMachine { job: usize, dose: Operation },

    /// No assignment was given for this job.
    MissingAssignment { job: usize },

    /// An assignment at this index has no job.
    UnexpectedAssignment { index: usize },

    /// Fewer machines were claimed than the schedule uses.
    MachineCountExceeded { claimed: usize, used: usize },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::RangeInconsistency {
                job,
                first_dose,
                second_dose,
            } => {
                write!(f, "job {job}: ")?;
                match (first_dose, second_dose) {
                    (true, true) => write!(f, "dose 1 out of range and dose 2 not anchored"),
                    (true, false) => write!(f, "dose 1 out of range"),
                    _ => write!(f, "dose 2 not anchored to dose 1"),
                }
            }
            Finding::DoubleBooking {
                machine,
                time,
                job_a,
                dose_a,
                job_b,
                dose_b,
            } => write!(
                f,
                "machine {machine} at {time}: job {job_a} {dose_a} overlaps job {job_b} {dose_b}"
            ),
            Finding::InvalidMachine { job, dose } => write!(f, "job {job}: {dose} on machine 0"),
            Finding::MissingAssignment { job } => write!(f, "job {job}: no assignment"),
            Finding::UnexpectedAssignment { index } => {
                write!(f, "assignment {index} does not belong to any job")
            }
            Finding::MachineCountExceeded { claimed, used } => {
                write!(f, "claimed {claimed} machine(s) but {used} are in use")
            }
        }
    }
}

/// All findings for one schedule.
///
/// Findings are listed per job first, then per machine and timeslot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerificationReport {
    pub findings: Vec<Finding>,
    /// Distinct machine indices the schedule references.
    pub machines_used: usize,
}

impl VerificationReport {
    /// Whether the schedule passed every check.
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Jobs with a [`Finding::RangeInconsistency`].
    pub fn inconsistent_jobs(&self) -> impl Iterator<Item = usize> + '_ {
        self.findings.iter().filter_map(|f| match f {
            Finding::RangeInconsistency { job, .. } => Some(*job),
            _ => None,
        })
    }

    /// Number of [`Finding::DoubleBooking`] entries.
    pub fn double_bookings(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::DoubleBooking { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let f = Finding::DoubleBooking {
            machine: 2,
            time: 7,
            job_a: 0,
            dose_a: Operation::First,
            job_b: 3,
            dose_b: Operation::Second,
        };
        assert_eq!(
            f.to_string(),
            "machine 2 at 7: job 0 dose 1 overlaps job 3 dose 2"
        );

        let f = Finding::RangeInconsistency {
            job: 4,
            first_dose: false,
            second_dose: true,
        };
        assert_eq!(f.to_string(), "job 4: dose 2 not anchored to dose 1");
    }

    #[test]
    fn test_report_queries() {
        let report = VerificationReport {
            findings: vec![
                Finding::RangeInconsistency {
                    job: 1,
                    first_dose: true,
                    second_dose: false,
                },
                Finding::MissingAssignment { job: 2 },
            ],
            machines_used: 1,
        };
        assert!(!report.is_valid());
        assert_eq!(report.len(), 2);
        assert_eq!(report.inconsistent_jobs().collect::<Vec<_>>(), vec![1]);
        assert_eq!(report.double_bookings(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_json() {
        let report = VerificationReport {
            findings: vec![Finding::InvalidMachine {
                job: 0,
                dose: Operation::Second,
            }],
            machines_used: 1,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["machines_used"], 1);
        let back: VerificationReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
