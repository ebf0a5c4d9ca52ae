//! Translation of a validated instance into a CP model.
//!
//! Every encoding minimizes a single machine-count variable `M` whose
//! domain is `[1, bound]`, where the bound is the first-fit machine count
//! unless [`BuildConfig::machine_limit`] overrides it.
//!
//! # Key Components
//!
//! - [`ModelBuilder`]: validates an [`Instance`](crate::instance::Instance)
//!   and emits a [`BuiltModel`]
//! - [`Encoding`]: time-indexed (with or without machine identity) or
//!   interval
//! - [`BuildConfig`]: encoding choice, size threshold and machine limit
//! - [`BuiltModel::decode`]: solver answer back to a
//!   [`Solution`](crate::instance::Solution)
//!
//! # References
//!
//! - Sousa & Wolsey (1992), "A time indexed formulation of non-preemptive
//!   single machine scheduling problems"
//! - Laborie, Rogerie, Shaw & Vilím (2018), "IBM ILOG CP optimizer for
//!   scheduling"

mod builder;
mod config;
mod decode;
mod interval;
mod time_indexed;

pub use builder::{BuiltModel, JobVars, ModelBuilder, OBJECTIVE};
pub use config::{BuildConfig, Encoding};
