//! Schedule verification.
//!
//! Checks a candidate schedule without trusting whichever model or
//! heuristic produced it: per-job start ranges and anchoring are
//! recomputed from raw job parameters, and machine occupancy is rebuilt
//! from the assignments with half-open `[start, start + duration)`
//! intervals. Every problem is reported; nothing aborts early.
//!
//! # Key Components
//!
//! - [`SolutionVerifier`]: the checker
//! - [`VerificationReport`]: aggregated [`Finding`]s

mod checker;
mod report;

pub use checker::SolutionVerifier;
pub use report::{Finding, VerificationReport};
