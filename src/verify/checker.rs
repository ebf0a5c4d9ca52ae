//! Independent schedule checker.

use super::report::{Finding, VerificationReport};
use crate::instance::{Assignment, Instance, Job, Operation, Params, Solution};
use std::collections::BTreeMap;
use tracing::debug;

/// Checks a schedule against raw job parameters.
///
/// Windows are recomputed here from `(r, d, x, l)` rather than taken from
/// a [`ValidatedInstance`](crate::instance::ValidatedInstance), and machine
/// occupancy is rebuilt from the assignments alone. The check is a pure
/// function of its inputs.
///
/// # Examples
///
/// ```
/// use u_doseplan::instance::{Assignment, Instance, Job, Params};
/// use u_doseplan::verify::SolutionVerifier;
///
/// let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(1, 1, 0, 1)]);
/// let report = SolutionVerifier::verify(&instance, &[Assignment::new(1, 1, 2, 1)], Some(1));
/// assert!(report.is_valid());
/// ```
pub struct SolutionVerifier;

impl SolutionVerifier {
    /// Verifies `assignments` (in job order) against `instance`.
    ///
    /// `claimed_machines` is the machine count reported alongside the
    /// schedule, if any.
    pub fn verify(
        instance: &Instance,
        assignments: &[Assignment],
        claimed_machines: Option<usize>,
    ) -> VerificationReport {
        let params = &instance.params;
        let mut findings = Vec::new();

        for (index, (job, a)) in instance.jobs.iter().zip(assignments).enumerate() {
            let first_dose = !first_in_range(job, params, a.first_start);
            let second_dose = !second_anchored(job, params, a.first_start, a.second_start);
            if first_dose || second_dose {
                findings.push(Finding::RangeInconsistency {
                    job: index,
                    first_dose,
                    second_dose,
                });
            }
            for dose in Operation::ALL {
                if a.machine(dose) == 0 {
                    findings.push(Finding::InvalidMachine { job: index, dose });
                }
            }
        }
        for job in assignments.len()..instance.jobs.len() {
            findings.push(Finding::MissingAssignment { job });
        }
        for index in instance.jobs.len()..assignments.len() {
            findings.push(Finding::UnexpectedAssignment { index });
        }

        let checked = &assignments[..assignments.len().min(instance.jobs.len())];
        findings.extend(double_bookings(checked, params));

        let machines_used = Solution::new(checked.to_vec(), 0).distinct_machines();
        if let Some(claimed) = claimed_machines {
            if claimed < machines_used {
                findings.push(Finding::MachineCountExceeded {
                    claimed,
                    used: machines_used,
                });
            }
        }

        debug!(
            jobs = instance.jobs.len(),
            findings = findings.len(),
            machines_used,
            "schedule verified"
        );
        VerificationReport {
            findings,
            machines_used,
        }
    }

    /// Verifies a solution together with its reported machine count.
    pub fn verify_solution(instance: &Instance, solution: &Solution) -> VerificationReport {
        Self::verify(instance, &solution.assignments, Some(solution.machines))
    }
}

fn first_in_range(job: &Job, params: &Params, t: i64) -> bool {
    let last = job.deadline as i128 - params.p1 as i128 + 1;
    job.release <= t && (t as i128) <= last
}

fn second_anchored(job: &Job, params: &Params, t: i64, s: i64) -> bool {
    let lo = t as i128 + params.p1 as i128 + params.gap as i128 + job.slack as i128;
    let hi = lo + job.second_window as i128 - params.p2 as i128;
    lo <= s as i128 && (s as i128) <= hi
}

/// One finding per overlapping pair per shared timeslot, per machine.
fn double_bookings(assignments: &[Assignment], params: &Params) -> Vec<Finding> {
    let mut by_machine: BTreeMap<usize, Vec<(i64, i64, usize, Operation)>> = BTreeMap::new();
    for (job, a) in assignments.iter().enumerate() {
        for dose in Operation::ALL {
            let duration = dose.duration(params);
            if duration <= 0 {
                continue;
            }
            let start = a.start(dose);
            by_machine.entry(a.machine(dose)).or_default().push((
                start,
                start.saturating_add(duration),
                job,
                dose,
            ));
        }
    }

    let mut findings = Vec::new();
    for (machine, mut operations) in by_machine {
        operations.sort_unstable();
        let mut clashes = Vec::new();
        for (i, &(start_a, end_a, job_a, dose_a)) in operations.iter().enumerate() {
            for &(start_b, end_b, job_b, dose_b) in &operations[i + 1..] {
                if start_b >= end_a {
                    break;
                }
                for time in start_b..end_a.min(end_b) {
                    clashes.push((time, job_a, dose_a, job_b, dose_b));
                }
            }
        }
        clashes.sort_unstable();
        findings.extend(
            clashes
                .into_iter()
                .map(|(time, job_a, dose_a, job_b, dose_b)| Finding::DoubleBooking {
                    machine,
                    time,
                    job_a,
                    dose_a,
                    job_b,
                    dose_b,
                }),
        );
    }
    findings
}
