//! Encoding comparison over many instances.
//!
//! Each instance is built and solved once per encoding, independently of
//! every other instance. With the `parallel` feature and
//! [`BatchConfig::parallel`] set, instances run on the rayon thread pool.

use crate::adapter::{solve_model, Outcome};
use crate::cp::{CpSolver, SolverConfig};
use crate::error::ScheduleError;
use crate::instance::{Instance, Solution};
use crate::model::{BuildConfig, Encoding, ModelBuilder};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for [`compare_encodings`].
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Encodings to run on every instance.
    pub encodings: Vec<Encoding>,
    /// Build settings; the encoding field is overridden per run.
    pub build: BuildConfig,
    /// Budget for every single solve.
    pub solver: SolverConfig,
    /// Run instances in parallel (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            encodings: vec![Encoding::TimeIndexed, Encoding::Interval],
            build: BuildConfig::default(),
            solver: SolverConfig::default(),
            parallel: true,
        }
    }
}

impl BatchConfig {
    pub fn with_encodings(mut self, encodings: Vec<Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = build;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.encodings.is_empty() {
            return Err("at least one encoding is required".into());
        }
        self.build.validate()?;
        self.solver.validate()
    }
}

/// One encoding's result on one instance.
#[derive(Debug, Clone)]
pub struct EncodingRun {
    pub encoding: Encoding,
    pub outcome: Result<Outcome, ScheduleError>,
    /// Variables in the built model (0 when building failed).
    pub variables: usize,
    /// Constraints in the built model (0 when building failed).
    pub constraints: usize,
    /// Build plus solve wall time.
    pub elapsed: Duration,
}

impl EncodingRun {
    /// Machine count found, if any.
    pub fn machines(&self) -> Option<usize> {
        self.outcome.as_ref().ok().and_then(Outcome::machines)
    }
}

/// All runs for one instance.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    /// Position of the instance in the batch.
    pub index: usize,
    pub jobs: usize,
    pub runs: Vec<EncodingRun>,
}

impl ComparisonRow {
    /// Whether every run that proved optimality reports the same `M`.
    pub fn optima_agree(&self) -> bool {
        let mut optima = self.runs.iter().filter_map(|run| match &run.outcome {
            Ok(Outcome::Optimal(solution)) => Some(solution.machines),
            _ => None,
        });
        match optima.next() {
            Some(first) => optima.all(|m| m == first),
            None => true,
        }
    }
}

/// Builds and solves every instance under every configured encoding.
///
/// Rows come back in instance order. Per-run failures are kept in
/// [`EncodingRun::outcome`] and do not stop the batch.
///
/// # Errors
///
/// [`ScheduleError::InvalidConfig`] for a rejected [`BatchConfig`].
pub fn compare_encodings<S: CpSolver + Sync + ?Sized>(
    instances: &[Instance],
    config: &BatchConfig,
    solver: &S,
) -> Result<Vec<ComparisonRow>, ScheduleError> {
    config.validate().map_err(ScheduleError::InvalidConfig)?;
    let started = Instant::now();

    let row = |(index, instance): (usize, &Instance)| ComparisonRow {
        index,
        jobs: instance.len(),
        runs: config
            .encodings
            .iter()
            .map(|&encoding| run_one(instance, encoding, config, solver))
            .collect(),
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<ComparisonRow> = if config.parallel {
        instances.par_iter().enumerate().map(row).collect()
    } else {
        instances.iter().enumerate().map(row).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<ComparisonRow> = instances.iter().enumerate().map(row).collect();

    info!(
        instances = rows.len(),
        disagreements = rows.iter().filter(|r| !r.optima_agree()).count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "encoding comparison finished"
    );
    Ok(rows)
}

fn run_one<S: CpSolver + ?Sized>(
    instance: &Instance,
    encoding: Encoding,
    config: &BatchConfig,
    solver: &S,
) -> EncodingRun {
    let started = Instant::now();
    let mut variables = 0;
    let mut constraints = 0;
    let outcome = if instance.is_empty() {
        Ok(Outcome::Optimal(Solution::new(Vec::new(), 0)))
    } else {
        let build = config.build.clone().with_encoding(encoding);
        match ModelBuilder::new(instance).with_config(build).build() {
            Ok(built) => {
                variables = built.model.variable_count();
                constraints = built.model.constraint_count();
                solve_model(&built, solver, &config.solver)
            }
            Err(err) => Err(err),
        }
    };
    EncodingRun {
        encoding,
        outcome,
        variables,
        constraints,
        elapsed: started.elapsed(),
    }
}
