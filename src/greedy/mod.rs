//! Greedy construction heuristics.
//!
//! Schedules jobs one at a time, the way an online booking desk would, and
//! opens a new machine only when nothing fits on the opened ones. The
//! result is always a valid schedule, so its machine count is an upper
//! bound on the optimum. The model builder uses it to bound machine
//! domains.
//!
//! - [`FirstFitScheduler`]: each dose goes to the earliest start that fits.
//! - [`BestFitScheduler`]: each job goes to the slot pair whose surrounding
//!   idle gaps score best.
//!
//! # Candidate starts
//!
//! On a single machine the earliest feasible start inside a window is
//! either the window start or the end of an existing booking, so first fit
//! only tries those points. Best fit also tries starts that end right where
//! a booking begins.

mod best_fit;
mod calendar;
mod scheduler;

pub use best_fit::BestFitScheduler;
pub use calendar::MachineCalendar;
pub use scheduler::{FirstFitScheduler, JobOrder};
