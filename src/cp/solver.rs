//! CP solver interface.

use super::model::CpModel;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded time limit (or was cancelled) without a solution.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

/// Solution for an interval variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSolution {
    /// Assigned start time.
    pub start: i64,
    /// Exclusive end time.
    pub end: i64,
    /// Interval size.
    pub size: i64,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if any).
    pub objective_value: Option<i64>,
    /// Interval variable assignments.
    pub intervals: HashMap<String, IntervalSolution>,
    /// Integer variable assignments.
    pub int_vars: HashMap<String, i64>,
    /// Boolean variable assignments.
    pub bool_vars: HashMap<String, bool>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
    /// Search nodes explored.
    pub nodes: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            intervals: HashMap::new(),
            int_vars: HashMap::new(),
            bool_vars: HashMap::new(),
            solve_time_ms: 0,
            nodes: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of an integer or boolean variable.
    pub fn value(&self, name: &str) -> Option<i64> {
        self.int_vars
            .get(name)
            .copied()
            .or_else(|| self.bool_vars.get(name).map(|&b| b as i64))
    }

    /// Returns the maximum end time across all intervals.
    pub fn max_end(&self) -> i64 {
        self.intervals.values().map(|s| s.end).max().unwrap_or(0)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: i64,
    /// Number of parallel workers.
    pub num_workers: usize,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 1,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: i64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms <= 0 {
            return Err(format!(
                "time_limit_ms must be positive, got {}",
                self.time_limit_ms
            ));
        }
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic.
/// This can wrap external solvers (e.g., OR-Tools CP-SAT, an ILP backend)
/// or provide custom search. Solvers only read the model; an abandoned
/// solve leaves it untouched.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        self.solve_with_cancel(model, config, None)
    }

    /// Solves with an optional cancellation token.
    ///
    /// Setting the flag stops the search as if the time limit was reached.
    fn solve_with_cancel(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_value_lookup() {
        let mut solution = CpSolution::empty(SolverStatus::Feasible);
        solution.int_vars.insert("T".into(), 4);
        solution.bool_vars.insert("y".into(), true);
        assert_eq!(solution.value("T"), Some(4));
        assert_eq!(solution.value("y"), Some(1));
        assert_eq!(solution.value("missing"), None);
        assert!(solution.is_solution_found());
    }

    #[test]
    fn test_max_end() {
        let mut solution = CpSolution::empty(SolverStatus::Feasible);
        solution.intervals.insert(
            "a".into(),
            IntervalSolution { start: 0, end: 50, size: 50 },
        );
        solution.intervals.insert(
            "b".into(),
            IntervalSolution { start: 10, end: 80, size: 70 },
        );
        assert_eq!(solution.max_end(), 80);
        assert!(!CpSolution::empty(SolverStatus::Timeout).is_solution_found());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, 60_000);
        assert_eq!(config.num_workers, 1);
        assert!(!config.stop_after_first);
        assert!(config.validate().is_ok());
        assert!(config.clone().with_time_limit_ms(0).validate().is_err());
        assert!(config.with_num_workers(0).validate().is_err());
    }
}
