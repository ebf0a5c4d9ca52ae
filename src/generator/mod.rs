//! Synthetic instance generation.
//!
//! Produces rigid jobs (one possible start per dose) under four placement
//! policies. Because nothing can move, the peak number of operations in
//! process at any timeslot is the optimal machine count, and every
//! generated instance carries it as a test oracle.
//!
//! # Key Components
//!
//! - [`InstanceGenerator`]: one seeded run per call
//! - [`GeneratorConfig`] / [`Policy`]: durations, job count, gap, policy
//! - [`OccupancyCounter`]: per-run occupancy per timeslot

mod config;
mod occupancy;
mod runner;

pub use config::{GeneratorConfig, Policy, GAP_UPPER_BOUND, SLACK_UPPER_BOUND};
pub use occupancy::OccupancyCounter;
pub use runner::{GeneratedInstance, InstanceGenerator};
