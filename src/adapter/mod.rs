//! Boundary between built models and CP solvers.
//!
//! Turns a raw [`SolverStatus`](crate::cp::SolverStatus) into an
//! [`Outcome`] and decodes any schedule. There are no retries here: a
//! caller that wants a larger budget after [`Outcome::TimedOut`] asks
//! again.
//!
//! # Key Components
//!
//! - [`Outcome`]: optimal, feasible, infeasible or timed out
//! - [`solve_model`] / [`solve_model_with_cancel`]: one solve attempt
//! - [`solve_instance`]: build plus solve, with the empty-instance
//!   short-circuit

mod runner;
mod types;

pub use runner::{solve_instance, solve_model, solve_model_with_cancel};
pub use types::Outcome;
