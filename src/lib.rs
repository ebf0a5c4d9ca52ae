//! Two-dose parallel-machine scheduling.
//!
//! Every job needs two operations ("doses") on identical machines: dose 1
//! inside a release/deadline window, and dose 2 inside a window anchored to
//! the actual start of dose 1. The goal is the fewest machines that can
//! serve every job.
//!
//! - **Instance**: jobs, shared durations and gap, and the derived start
//!   windows (rejecting jobs that can never be scheduled).
//! - **CP (Constraint Programming)**: Domain-agnostic modeling layer with
//!   integer, boolean and interval variables, the `CpSolver` seam, and an
//!   exact backtracking solver.
//! - **Model**: Time-indexed and interval encodings of the problem, both
//!   minimizing the machine count, plus decoding back to schedules.
//! - **Adapter**: Solver answers mapped to optimal / feasible /
//!   infeasible / timed-out outcomes.
//! - **Verify**: Independent schedule checker reporting every range
//!   violation and double booking.
//! - **Generator**: Seeded synthetic instances with a known optimum.
//! - **Greedy**: First-fit and best-fit heuristics, an upper bound on the machine count.
//! - **Text**: Line-oriented instance and solution formats.
//! - **Batch**: Encoding comparison across many instances.
//!
//! # Conventions
//!
//! Start windows are inclusive; processing occupies the half-open range
//! `[start, start + duration)`. Machines are numbered from 1.
//!
//! # Example
//!
//! ```
//! use u_doseplan::adapter::solve_instance;
//! use u_doseplan::cp::{BacktrackingSolver, SolverConfig};
//! use u_doseplan::model::BuildConfig;
//! use u_doseplan::text::parse_instance;
//! use u_doseplan::verify::SolutionVerifier;
//!
//! let instance = parse_instance("2\n1\n0\n2\n1, 2, 0, 1\n1, 2, 0, 1\n").unwrap();
//! let outcome = solve_instance(
//!     &instance,
//!     BuildConfig::default(),
//!     &BacktrackingSolver::new(),
//!     &SolverConfig::default(),
//! )
//! .unwrap();
//!
//! let solution = outcome.solution().unwrap();
//! assert_eq!(solution.machines, 2);
//! assert!(SolutionVerifier::verify_solution(&instance, solution).is_valid());
//! ```

pub mod adapter;
pub mod batch;
pub mod cp;
pub mod error;
pub mod generator;
pub mod greedy;
pub mod instance;
pub mod model;
pub mod text;
pub mod verify;
