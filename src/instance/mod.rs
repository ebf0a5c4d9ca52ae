//! Jobs, instances and feasible start windows.
//!
//! A job (patient) needs two operations (doses). Operation 1 may start in
//! `[r, d - p1 + 1]`; operation 2 is anchored to the realized start `T` of
//! operation 1 and must start in `[T + p1 + gap + x, T + p1 + gap + x + l - p2]`.
//!
//! Windows are inclusive ranges of start timeslots. Processing occupies the
//! half-open range `[start, start + duration)`. Both conventions are shared
//! by every encoding and by the verifier.
//!
//! # Key Components
//!
//! - [`Job`], [`Params`], [`Instance`]: raw input as read or generated
//! - [`Window`]: derived start windows plus the anchoring offsets
//! - [`ValidatedInstance`]: jobs paired with their cached windows

mod job;
mod window;

pub use job::{Assignment, Instance, Job, Operation, Params, Solution};
pub use window::{ValidatedInstance, Window, WindowedJob};
