//! Instance generation loop.

use super::config::{GeneratorConfig, Policy, GAP_UPPER_BOUND, SLACK_UPPER_BOUND};
use super::occupancy::OccupancyCounter;
use crate::error::ScheduleError;
use crate::instance::{Instance, Job, Params};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use tracing::debug;

/// A generated instance and its known optimum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedInstance {
    pub instance: Instance,
    /// Minimum machine count, when the policy determines it.
    ///
    /// Generated jobs are rigid, so this is the peak number of operations
    /// in process at any timeslot.
    pub expected_machines: Option<usize>,
}

/// Synthetic instance generator.
///
/// # Examples
///
/// ```
/// use u_doseplan::generator::{GeneratorConfig, InstanceGenerator, Policy};
///
/// let config = GeneratorConfig::default()
///     .with_policy(Policy::Consecutive)
///     .with_job_count(20)
///     .with_seed(42);
/// let generated = InstanceGenerator::generate(&config).unwrap();
/// assert_eq!(generated.instance.len(), 20);
/// assert_eq!(generated.expected_machines, Some(1));
/// ```
pub struct InstanceGenerator;

impl InstanceGenerator {
    /// Generates one instance.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InvalidConfig`] for a rejected configuration.
    pub fn generate(config: &GeneratorConfig) -> Result<GeneratedInstance, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let gap = match config.gap {
            Some(gap) => gap,
            None => rng.random_range(0..=GAP_UPPER_BOUND),
        };
        let k = config.multiplier();
        let params = Params::new(config.p1 * k, config.p2 * k, gap);

        let n = config.job_count as i64;
        let mut occupancy = OccupancyCounter::new();
        let mut horizon = n * (params.p1 + params.p2 + gap + SLACK_UPPER_BOUND);
        let mut next_release = 1;
        let mut jobs = Vec::with_capacity(config.job_count);

        for _ in 0..config.job_count {
            let job = match config.policy {
                Policy::Fixed | Policy::Multiplication { .. } => {
                    rigid_job(rng.random_range(1..=n), &params, &mut rng)
                }
                Policy::Consecutive => {
                    let job = rigid_job(next_release, &params, &mut rng);
                    next_release = job.deadline + job.slack + gap + 1 + job.second_window;
                    job
                }
                Policy::ForceMachineMax { machine_max } => {
                    let job = rigid_job(rng.random_range(1..=n), &params, &mut rng);
                    let fits = |job: &Job| {
                        let (first, second) = occupied(job, &params);
                        occupancy.fits(first, machine_max) && occupancy.fits(second, machine_max)
                    };
                    if fits(&job) {
                        job
                    } else {
                        // Past every placed job, so nothing can clash.
                        let release = horizon.max(occupancy.end());
                        let moved = rigid_job(release, &params, &mut rng);
                        horizon = release + params.p1 + params.p2 + moved.slack + gap;
                        moved
                    }
                }
            };

            let (first, second) = occupied(&job, &params);
            occupancy.add(first);
            occupancy.add(second);
            jobs.push(job);
        }

        let expected_machines = occupancy.peak();
        debug!(
            policy = ?config.policy,
            jobs = jobs.len(),
            gap,
            expected_machines,
            "instance generated"
        );
        Ok(GeneratedInstance {
            instance: Instance::new(params, jobs),
            expected_machines: Some(expected_machines),
        })
    }
}

/// A job with exactly one start per dose, released at `release`.
fn rigid_job(release: i64, params: &Params, rng: &mut StdRng) -> Job {
    let slack = rng.random_range(0..=SLACK_UPPER_BOUND);
    Job::new(release, release + params.p1 - 1, slack, params.p2)
}

/// Timeslots in process for both doses of a rigid job.
fn occupied(job: &Job, params: &Params) -> (Range<i64>, Range<i64>) {
    let first = job.release..job.release + params.p1;
    let second_start = job.deadline + params.gap + job.slack + 1;
    (first, second_start..second_start + job.second_window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::solve_instance;
    use crate::cp::{BacktrackingSolver, SolverConfig};
    use crate::instance::{Assignment, Operation};
    use crate::model::{BuildConfig, Encoding};
    use crate::verify::SolutionVerifier;
    use proptest::prelude::*;

    fn generate(config: GeneratorConfig) -> GeneratedInstance {
        InstanceGenerator::generate(&config).unwrap()
    }

    /// The only schedule of a rigid instance, everything on machine 1.
    fn single_machine_schedule(instance: &Instance) -> Vec<Assignment> {
        instance
            .jobs
            .iter()
            .map(|job| {
                let s = job.release + instance.params.p1 + instance.params.gap + job.slack;
                Assignment::new(job.release, 1, s, 1)
            })
            .collect()
    }

    #[test]
    fn test_same_seed_same_instance() {
        let config = GeneratorConfig::default().with_job_count(15).with_seed(42);
        assert_eq!(generate(config.clone()), generate(config));
    }

    #[test]
    fn test_fixed_jobs_are_rigid() {
        let generated = generate(
            GeneratorConfig::default()
                .with_durations(3, 2)
                .with_job_count(30)
                .with_seed(1),
        );
        let instance = &generated.instance;
        let validated = instance.validate().unwrap();
        assert!((0..=GAP_UPPER_BOUND).contains(&instance.params.gap));
        for (job, windowed) in instance.jobs.iter().zip(&validated.jobs) {
            assert!((1..=30).contains(&job.release));
            assert_eq!(job.deadline, job.release + 2);
            assert!((0..=SLACK_UPPER_BOUND).contains(&job.slack));
            assert_eq!(job.second_window, 2);
            assert_eq!(windowed.window.size(Operation::First), 1);
            assert_eq!(windowed.window.size(Operation::Second), 1);
        }
    }

    #[test]
    fn test_fixed_gap_is_used() {
        let generated = generate(GeneratorConfig::default().with_gap(7).with_seed(3));
        assert_eq!(generated.instance.params.gap, 7);
    }

    #[test]
    fn test_zero_jobs() {
        let generated = generate(GeneratorConfig::default().with_job_count(0).with_seed(5));
        assert!(generated.instance.is_empty());
        assert_eq!(generated.expected_machines, Some(0));
    }

    #[test]
    fn test_multiplication_scales_durations() {
        let generated = generate(
            GeneratorConfig::default()
                .with_policy(Policy::Multiplication { multiplier: 4 })
                .with_durations(2, 3)
                .with_seed(9),
        );
        let instance = &generated.instance;
        assert_eq!((instance.params.p1, instance.params.p2), (8, 12));
        for job in &instance.jobs {
            assert_eq!(job.deadline - job.release + 1, 8);
            assert_eq!(job.second_window, 12);
        }
        assert!(instance.validate().is_ok());
    }

    #[test]
    fn test_force_machine_max_respects_cap() {
        for seed in 0..10 {
            let generated = generate(
                GeneratorConfig::default()
                    .with_policy(Policy::ForceMachineMax { machine_max: 2 })
                    .with_durations(2, 2)
                    .with_job_count(25)
                    .with_seed(seed),
            );
            let expected = generated.expected_machines.unwrap();
            assert!((1..=2).contains(&expected), "seed {seed}: {expected}");
            assert!(generated.instance.validate().is_ok());
        }
    }

    #[test]
    fn test_expected_machines_is_the_optimum() {
        let generated = generate(
            GeneratorConfig::default()
                .with_policy(Policy::ForceMachineMax { machine_max: 2 })
                .with_job_count(6)
                .with_gap(0)
                .with_seed(11),
        );
        let outcome = solve_instance(
            &generated.instance,
            BuildConfig::default().with_encoding(Encoding::Interval),
            &BacktrackingSolver::new(),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(outcome.machines(), generated.expected_machines);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_consecutive_fits_one_machine(
            seed in any::<u64>(),
            jobs in 1usize..60,
            p1 in 1i64..5,
            p2 in 1i64..5,
        ) {
            let generated = generate(
                GeneratorConfig::default()
                    .with_policy(Policy::Consecutive)
                    .with_durations(p1, p2)
                    .with_job_count(jobs)
                    .with_seed(seed),
            );
            prop_assert_eq!(generated.expected_machines, Some(1));

            let instance = &generated.instance;
            let schedule = single_machine_schedule(instance);
            let report = SolutionVerifier::verify(instance, &schedule, Some(1));
            prop_assert!(report.is_valid(), "{:?}", report.findings);
        }
    }
}
