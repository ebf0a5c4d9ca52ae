//! Solve outcomes.

use crate::instance::Solution;

/// Verdict of one solve attempt.
///
/// [`Outcome::Infeasible`] and [`Outcome::TimedOut`] are distinct: only the
/// first is a statement about the instance. Solver crashes are not
/// outcomes; they surface as
/// [`ScheduleError::SolverFailure`](crate::error::ScheduleError::SolverFailure).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Schedule with a proven minimum machine count.
    Optimal(Solution),
    /// Valid schedule whose machine count may not be minimal.
    Feasible(Solution),
    /// No schedule exists within the machine domain.
    Infeasible,
    /// The budget ran out before any schedule was found.
    TimedOut,
}

impl Outcome {
    /// The schedule, if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Optimal(solution) | Outcome::Feasible(solution) => Some(solution),
            Outcome::Infeasible | Outcome::TimedOut => None,
        }
    }

    /// Machine count of the schedule, if one was found.
    pub fn machines(&self) -> Option<usize> {
        self.solution().map(|s| s.machines)
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, Outcome::Optimal(_))
    }

    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Optimal(_) => "optimal",
            Outcome::Feasible(_) => "feasible",
            Outcome::Infeasible => "infeasible",
            Outcome::TimedOut => "timed-out",
        }
    }
}
