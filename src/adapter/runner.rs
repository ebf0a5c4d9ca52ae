//! Solve entry points.

use super::types::Outcome;
use crate::cp::{CpSolver, SolverConfig, SolverStatus};
use crate::error::ScheduleError;
use crate::instance::{Instance, Solution};
use crate::model::{BuildConfig, BuiltModel, ModelBuilder};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

/// Solves a built model under `budget` and decodes the answer.
///
/// # Errors
///
/// - [`ScheduleError::InvalidConfig`] for a rejected budget
/// - [`ScheduleError::SolverFailure`] when the solver reports an invalid
///   model, gives up for an unknown reason, or returns an answer that
///   cannot be decoded
pub fn solve_model<S: CpSolver + ?Sized>(
    built: &BuiltModel,
    solver: &S,
    budget: &SolverConfig,
) -> Result<Outcome, ScheduleError> {
    solve_model_with_cancel(built, solver, budget, None)
}

/// Like [`solve_model`], with an external cancellation flag.
///
/// A cancelled solve reports what it had found so far: a schedule as
/// [`Outcome::Feasible`], otherwise [`Outcome::TimedOut`].
pub fn solve_model_with_cancel<S: CpSolver + ?Sized>(
    built: &BuiltModel,
    solver: &S,
    budget: &SolverConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Outcome, ScheduleError> {
    budget.validate().map_err(ScheduleError::InvalidConfig)?;

    let answer = solver.solve_with_cancel(&built.model, budget, cancel);
    let outcome = match answer.status {
        SolverStatus::Optimal => Outcome::Optimal(built.decode(&answer)?),
        SolverStatus::Feasible => Outcome::Feasible(built.decode(&answer)?),
        SolverStatus::Infeasible => Outcome::Infeasible,
        SolverStatus::Timeout => Outcome::TimedOut,
        status @ (SolverStatus::ModelInvalid | SolverStatus::Unknown) => {
            warn!(model = %built.model.name, ?status, "solver failed");
            return Err(ScheduleError::SolverFailure(format!(
                "solver returned {status:?} for {}",
                built.model.name
            )));
        }
    };

    info!(
        model = %built.model.name,
        outcome = outcome.label(),
        machines = ?outcome.machines(),
        solve_time_ms = answer.solve_time_ms,
        "solve finished"
    );
    Ok(outcome)
}

/// Builds and solves in one step.
///
/// An instance without jobs needs no machines: it yields
/// `Outcome::Optimal` with `M = 0` and the solver is never called.
///
/// # Examples
///
/// ```
/// use u_doseplan::adapter::{solve_instance, Outcome};
/// use u_doseplan::cp::{BacktrackingSolver, SolverConfig};
/// use u_doseplan::instance::{Instance, Job, Params};
/// use u_doseplan::model::BuildConfig;
///
/// let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(3, 3, 0, 1)]);
/// let outcome = solve_instance(
///     &instance,
///     BuildConfig::default(),
///     &BacktrackingSolver::new(),
///     &SolverConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(outcome.machines(), Some(1));
/// ```
pub fn solve_instance<S: CpSolver + ?Sized>(
    instance: &Instance,
    config: BuildConfig,
    solver: &S,
    budget: &SolverConfig,
) -> Result<Outcome, ScheduleError> {
    if instance.is_empty() {
        info!("empty instance, no machines needed");
        return Ok(Outcome::Optimal(Solution::new(Vec::new(), 0)));
    }
    let built = ModelBuilder::new(instance).with_config(config).build()?;
    solve_model(&built, solver, budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BacktrackingSolver, CpModel, CpSolution};
    use crate::instance::{Assignment, Job, Params};
    use crate::model::Encoding;
    use crate::verify::SolutionVerifier;
    use proptest::prelude::*;

    /// Answers every model with a fixed status and no values.
    struct FixedStatus(SolverStatus);

    impl CpSolver for FixedStatus {
        fn solve_with_cancel(
            &self,
            _model: &CpModel,
            _config: &SolverConfig,
            _cancel: Option<Arc<AtomicBool>>,
        ) -> CpSolution {
            CpSolution::empty(self.0)
        }
    }

    struct MustNotRun;

    impl CpSolver for MustNotRun {
        fn solve_with_cancel(
            &self,
            _model: &CpModel,
            _config: &SolverConfig,
            _cancel: Option<Arc<AtomicBool>>,
        ) -> CpSolution {
            panic!("solver invoked for an empty instance");
        }
    }

    fn unit_job() -> Instance {
        Instance::new(Params::new(1, 1, 0), vec![Job::new(4, 4, 0, 1)])
    }

    fn built(instance: &Instance, encoding: Encoding) -> BuiltModel {
        ModelBuilder::new(instance)
            .with_config(BuildConfig::default().with_encoding(encoding))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_instance_short_circuits() {
        let instance = Instance::new(Params::new(1, 1, 0), vec![]);
        let outcome = solve_instance(
            &instance,
            BuildConfig::default(),
            &MustNotRun,
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Optimal(Solution::new(vec![], 0)));
    }

    #[test]
    fn test_single_unit_job() {
        let outcome = solve_instance(
            &unit_job(),
            BuildConfig::default(),
            &BacktrackingSolver::new(),
            &SolverConfig::default(),
        )
        .unwrap();
        let solution = outcome.solution().unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(solution.machines, 1);
        assert_eq!(solution.assignments, vec![Assignment::new(4, 1, 5, 1)]);
    }

    #[test]
    fn test_status_mapping() {
        let model = built(&unit_job(), Encoding::Interval);
        let budget = SolverConfig::default();

        let infeasible = solve_model(&model, &FixedStatus(SolverStatus::Infeasible), &budget);
        assert_eq!(infeasible.unwrap(), Outcome::Infeasible);

        let timeout = solve_model(&model, &FixedStatus(SolverStatus::Timeout), &budget);
        assert_eq!(timeout.unwrap(), Outcome::TimedOut);

        for status in [SolverStatus::ModelInvalid, SolverStatus::Unknown] {
            let err = solve_model(&model, &FixedStatus(status), &budget).unwrap_err();
            assert!(matches!(err, ScheduleError::SolverFailure(_)));
        }

        // Claims a solution but carries no values.
        let err = solve_model(&model, &FixedStatus(SolverStatus::Optimal), &budget).unwrap_err();
        assert!(matches!(err, ScheduleError::SolverFailure(_)));
    }

    #[test]
    fn test_machine_limit_below_optimum_is_infeasible() {
        let instance = Instance::new(
            Params::new(2, 1, 0),
            vec![Job::new(1, 2, 0, 1), Job::new(1, 2, 0, 1)],
        );
        let config = BuildConfig::default()
            .with_encoding(Encoding::Interval)
            .with_machine_limit(1);
        let outcome = solve_instance(
            &instance,
            config,
            &BacktrackingSolver::new(),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Infeasible);
    }

    #[test]
    fn test_cancelled_solve_times_out() {
        let model = built(&unit_job(), Encoding::TimeIndexed);
        let cancel = Arc::new(AtomicBool::new(true));
        let outcome = solve_model_with_cancel(
            &model,
            &BacktrackingSolver::new(),
            &SolverConfig::default(),
            Some(cancel),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
    }

    #[test]
    fn test_invalid_budget_rejected() {
        let model = built(&unit_job(), Encoding::Interval);
        let budget = SolverConfig::default().with_time_limit_ms(0);
        let err = solve_model(&model, &BacktrackingSolver::new(), &budget).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
    }

    fn small_instance() -> impl Strategy<Value = Instance> {
        (1i64..3, 1i64..3, 0i64..3).prop_flat_map(|(p1, p2, gap)| {
            let job = (0i64..4, 0i64..3, 0i64..2, 0i64..2)
                .prop_map(move |(r, span, x, extra)| Job::new(r, r + p1 - 1 + span, x, p2 + extra));
            prop::collection::vec(job, 1..4)
                .prop_map(move |jobs| Instance::new(Params::new(p1, p2, gap), jobs))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_encodings_agree_and_verify(instance in small_instance()) {
            let solver = BacktrackingSolver::new();
            let budget = SolverConfig::default();
            let mut optima = Vec::new();
            for encoding in [
                Encoding::TimeIndexed,
                Encoding::TimeIndexedWithMachines,
                Encoding::Interval,
            ] {
                let outcome = solve_model(&built(&instance, encoding), &solver, &budget).unwrap();
                prop_assert!(outcome.is_optimal(), "{:?}: {:?}", encoding, outcome);
                let solution = outcome.solution().unwrap();
                let report = SolutionVerifier::verify_solution(&instance, solution);
                prop_assert!(report.is_valid(), "{:?}: {:?}", encoding, report.findings);
                optima.push(solution.machines);
            }
            prop_assert!(optima.iter().all(|&m| m == optima[0]), "{:?}", optima);
        }
    }
}
