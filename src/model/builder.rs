//! Model construction.

use super::config::{BuildConfig, Encoding};
use super::{interval, time_indexed};
use crate::cp::{CpModel, IntVar, Objective};
use crate::error::ScheduleError;
use crate::greedy::{BestFitScheduler, FirstFitScheduler, JobOrder};
use crate::instance::{Instance, Operation, Params, ValidatedInstance};
use tracing::{debug, info};

/// Name of the machine-count variable every encoding minimizes.
pub const OBJECTIVE: &str = "M";

pub(super) fn start_name(job: usize, op: Operation) -> String {
    match op {
        Operation::First => format!("T_{job}"),
        Operation::Second => format!("S_{job}"),
    }
}

/// Variable names holding one job's decision values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobVars {
    /// Start of dose 1 (`T`).
    pub first_start: String,
    /// Start of dose 2 (`S`).
    pub second_start: String,
    /// Machine index of dose 1, when the encoding has one.
    pub first_machine: Option<String>,
    /// Machine index of dose 2, when the encoding has one.
    pub second_machine: Option<String>,
}

/// A CP model together with what is needed to read a schedule back out of
/// a solver answer.
///
/// Built fresh per solve; solvers only borrow [`BuiltModel::model`].
#[derive(Debug, Clone)]
pub struct BuiltModel {
    /// The model handed to a solver.
    pub model: CpModel,
    /// Encoding that produced the model.
    pub encoding: Encoding,
    /// Instance parameters, needed to place decoded operations.
    pub params: Params,
    /// Per-job variable names, in instance order.
    pub jobs: Vec<JobVars>,
    /// Upper bound of the machine domain.
    pub machine_bound: usize,
}

impl BuiltModel {
    /// Number of jobs in the model.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

/// Builds a minimize-`M` CP model for an instance.
///
/// # Examples
///
/// ```
/// use u_doseplan::instance::{Instance, Job, Params};
/// use u_doseplan::model::{BuildConfig, Encoding, ModelBuilder};
///
/// let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(1, 1, 0, 1)]);
/// let built = ModelBuilder::new(&instance)
///     .with_config(BuildConfig::default().with_encoding(Encoding::Interval))
///     .build()
///     .unwrap();
/// assert_eq!(built.encoding, Encoding::Interval);
/// assert_eq!(built.machine_bound, 1);
/// ```
pub struct ModelBuilder<'a> {
    instance: &'a Instance,
    config: BuildConfig,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            config: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the instance and builds the model.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::InvalidConfig`] for a rejected [`BuildConfig`]
    /// - [`ScheduleError::EmptyInstance`] when there are no jobs
    /// - [`ScheduleError::InvalidJobs`] listing every defective job
    pub fn build(&self) -> Result<BuiltModel, ScheduleError> {
        self.config.validate().map_err(ScheduleError::InvalidConfig)?;
        if self.instance.is_empty() {
            return Err(ScheduleError::EmptyInstance);
        }
        let validated = self.instance.validate()?;

        let encoding = match self.config.encoding {
            Some(encoding) => encoding,
            None => self.config.resolve(validated.total_window_size()),
        };
        let machine_bound = match self.config.machine_limit {
            Some(limit) => limit,
            None => greedy_bound(&validated),
        };
        debug!(
            encoding = encoding.name(),
            machine_bound,
            "building model"
        );

        let horizon = validated.max_occupied().unwrap_or(0).saturating_add(1);
        let mut model = CpModel::new(format!("doseplan/{}", encoding.name()), horizon);
        model.add_int_var(IntVar::new(OBJECTIVE, 1, machine_bound as i64));
        let jobs = match encoding {
            Encoding::TimeIndexed => time_indexed::encode(&mut model, &validated, machine_bound, false),
            Encoding::TimeIndexedWithMachines => {
                time_indexed::encode(&mut model, &validated, machine_bound, true)
            }
            Encoding::Interval => interval::encode(&mut model, &validated, machine_bound),
        };
        model.set_objective(Objective::minimize(OBJECTIVE));
        model.validate()?;

        info!(
            model = %model.name,
            jobs = jobs.len(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "model built"
        );
        Ok(BuiltModel {
            model,
            encoding,
            params: validated.params,
            jobs,
            machine_bound,
        })
    }
}

/// Fewest machines any greedy placement and job order needs.
fn greedy_bound(instance: &ValidatedInstance) -> usize {
    [JobOrder::Input, JobOrder::EarliestRelease, JobOrder::TightestWindow]
        .into_iter()
        .flat_map(|order| {
            [
                FirstFitScheduler::schedule(instance, order).machines,
                BestFitScheduler::schedule(instance, order).machines,
            ]
        })
        .min()
        .unwrap_or(1)
        .max(1)
}
