//! Error types.
//!
//! Job-level problems are collected per offending job instead of aborting
//! on the first one, so a caller always sees the full list of defects in
//! an instance.

use crate::instance::Operation;

/// Why a single job can never be scheduled, regardless of machine count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobDefect {
    /// `p1` or `p2` is zero or negative.
    #[error("{operation} duration must be positive, got {duration}")]
    NonPositiveDuration {
        /// Operation whose duration is invalid.
        operation: Operation,
        /// The offending duration.
        duration: i64,
    },
    /// The second-dose window `l` is shorter than `p2`.
    #[error("second-dose window {window} is shorter than its processing time {duration}")]
    SecondWindowTooShort {
        /// Window length `l`.
        window: i64,
        /// Processing time `p2`.
        duration: i64,
    },
    /// `d < r + p1 - 1`: the first dose cannot complete by its deadline.
    #[error("deadline {deadline} leaves no room for the first dose released at {release}")]
    DeadlineTooEarly {
        /// Release `r`.
        release: i64,
        /// Deadline `d`.
        deadline: i64,
    },
    /// A derived window has `first > last`.
    #[error("{operation} window [{first}, {last}] is empty")]
    EmptyWindow {
        /// Operation with the empty window.
        operation: Operation,
        /// Derived first possible start.
        first: i64,
        /// Derived last possible start.
        last: i64,
    },
    /// Window arithmetic does not fit in `i64`.
    #[error("window arithmetic overflows")]
    Overflow,
}

/// A defective job together with its position in the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("job {job}: {defect}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvalidJob {
    /// Zero-based job index in input order.
    pub job: usize,
    /// What is wrong with it.
    pub defect: JobDefect,
}

/// Structural problems in a [`CpModel`](crate::cp::CpModel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("undefined interval: {0}")]
    UndefinedInterval(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("variable {name} has empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },

    #[error("no-overlap-2d: {x} time intervals but {y} machine intervals")]
    LengthMismatch { x: usize, y: usize },

    #[error("interval {0} has negative size")]
    NegativeSize(String),
}

/// Malformed instance or solution text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected}")]
    MissingLine { line: usize, expected: &'static str },

    #[error("line {line}: invalid integer {value:?}")]
    InvalidInteger { line: usize, value: String },

    #[error("line {line}: expected {expected} comma-separated values, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {what} must not be negative, got {value}")]
    Negative {
        line: usize,
        what: &'static str,
        value: i64,
    },
}

/// Top-level error type of the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// The instance has no jobs. Callers should report zero machines
    /// without building a model.
    #[error("instance contains no jobs")]
    EmptyInstance,

    #[error("{} job(s) failed validation: {}", .0.len(), join_defects(.0))]
    InvalidJobs(Vec<InvalidJob>),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The solver crashed or returned an unusable answer. This is fatal for
    /// the solve attempt and says nothing about schedulability.
    #[error("solver failure: {0}")]
    SolverFailure(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn join_defects(jobs: &[InvalidJob]) -> String {
    jobs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
