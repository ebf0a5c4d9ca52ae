//! Constraint Programming (CP) modeling layer.
//!
//! Provides a domain-agnostic model for expressing constrained optimization
//! problems using integer, boolean and fixed-size interval variables.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`BoolVar`], [`IntervalVar`]: decision variables
//! - **Constraints**: [`Constraint`]: Linear, NoOverlap2D, MaxEquality
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait, the interface for solver implementations
//!
//! # Design
//!
//! The model is a plain value: building it has no side effects and solvers
//! only read it. [`CpSolver`] is the seam for external engines (an ILP
//! backend for the time-indexed encoding, CP-SAT for the interval encoding).
//! [`BacktrackingSolver`] is a small exact reference implementation.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, Objective};
pub use search::BacktrackingSolver;
pub use solver::{CpSolution, CpSolver, IntervalSolution, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntVar, IntervalVar};
