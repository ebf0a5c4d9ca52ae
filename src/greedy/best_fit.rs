//! Score-based slot selection.
//!
//! Instead of taking the earliest pair of starts, every candidate pair on
//! the opened machines is scored by the idle gaps it leaves around both
//! doses, and the best one wins. A gap scores:
//!
//! | Gap | Score |
//! |---|---|
//! | none (nothing booked on that side) or zero | 3 |
//! | exactly fillable by later doses (`a * p1 + b * p2`) | 2 |
//! | anything else | 0 |
//!
//! Four gaps per job give a perfect score of 12, which ends the search
//! early. Ties keep the first pair found (lowest machines, earliest starts).

use super::calendar::MachineCalendar;
use super::scheduler::{job_order, JobOrder};
use crate::instance::{Assignment, Params, Solution, ValidatedInstance, WindowedJob};
use tracing::debug;

const PERFECT_SCORE: u32 = 12;

/// Builds a valid schedule greedily, placing each job in its best-scoring
/// slot pair.
///
/// # Examples
///
/// ```
/// use u_doseplan::greedy::{BestFitScheduler, JobOrder};
/// use u_doseplan::instance::{Instance, Job, Params};
///
/// let instance = Instance::new(
///     Params::new(1, 1, 0),
///     vec![Job::new(1, 1, 0, 1), Job::new(1, 3, 0, 1)],
/// );
/// let validated = instance.validate().unwrap();
/// let solution = BestFitScheduler::schedule(&validated, JobOrder::Input);
/// assert_eq!(solution.machines, 1);
/// ```
pub struct BestFitScheduler;

impl BestFitScheduler {
    /// Schedules every job; machine indices in the result are 1-based.
    pub fn schedule(instance: &ValidatedInstance, order: JobOrder) -> Solution {
        let params = instance.params;
        let mut calendar = MachineCalendar::new();
        let mut assignments = vec![Assignment::new(0, 0, 0, 0); instance.jobs.len()];

        for index in job_order(&instance.jobs, order) {
            let job = &instance.jobs[index];
            // An empty machine always admits a job, so this opens at most one.
            let (t, m1, s, m2) = loop {
                if let Some(slot) = best_slot(&calendar, job, &params) {
                    break slot;
                }
                calendar.open();
            };
            calendar.book(m1, t, t + params.p1);
            calendar.book(m2, s, s + params.p2);
            assignments[index] = Assignment::new(t, m1 + 1, s, m2 + 1);
        }

        debug!(
            jobs = instance.jobs.len(),
            machines = calendar.len(),
            ?order,
            "best-fit schedule built"
        );
        Solution::new(assignments, calendar.len())
    }
}

/// Highest-scoring free `(T, m1, S, m2)` on the opened machines, 0-based.
fn best_slot(calendar: &MachineCalendar, job: &WindowedJob, params: &Params) -> Option<(i64, usize, i64, usize)> {
    let w = &job.window;
    let (p1, p2) = (params.p1, params.p2);
    let mut best: Option<(u32, (i64, usize, i64, usize))> = None;

    for m1 in 0..calendar.len() {
        for t in calendar.touching_starts(m1, w.first[0], w.last[0], p1, None) {
            if !calendar.is_free(m1, t, t + p1) {
                continue;
            }
            let dose1 = (t, t + p1);
            for m2 in 0..calendar.len() {
                let extra = (m2 == m1).then_some(dose1);
                let (s_lo, s_hi) = (t + w.anchor_min, t + w.anchor_max);
                for s in calendar.touching_starts(m2, s_lo, s_hi, p2, extra) {
                    if !calendar.is_free_with(m2, s, s + p2, extra) {
                        continue;
                    }
                    let dose2 = (s, s + p2);
                    let score = slot_score(calendar, (m1, dose1), (m2, dose2), params);
                    if best.map_or(true, |(top, _)| score > top) {
                        best = Some((score, (t, m1, s, m2)));
                        if score == PERFECT_SCORE {
                            return Some((t, m1, s, m2));
                        }
                    }
                }
            }
        }
    }
    best.map(|(_, slot)| slot)
}

fn slot_score(
    calendar: &MachineCalendar,
    (m1, dose1): (usize, (i64, i64)),
    (m2, dose2): (usize, (i64, i64)),
    params: &Params,
) -> u32 {
    let shared = m1 == m2;
    let (b1, a1) = calendar.neighbour_gaps(m1, dose1.0, dose1.1, shared.then_some(dose2));
    let (b2, a2) = calendar.neighbour_gaps(m2, dose2.0, dose2.1, shared.then_some(dose1));
    [b1, a1, b2, a2]
        .into_iter()
        .map(|gap| gap_score(gap, params.p1, params.p2))
        .sum()
}

fn gap_score(gap: Option<i64>, p1: i64, p2: i64) -> u32 {
    match gap {
        None | Some(0) => 3,
        Some(g) if fillable(g, p1, p2) => 2,
        Some(_) => 0,
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Whether `gap = a * p1 + b * p2` for some `a, b >= 0`.
fn fillable(gap: i64, p1: i64, p2: i64) -> bool {
    let g = gcd(p1, p2);
    if gap < 0 || gap % g != 0 {
        return false;
    }
    let (gap, small, large) = (gap / g, p1.min(p2) / g, p1.max(p2) / g);
    // Every multiple of g from (small - 1)(large - 1) on is representable.
    if (small - 1)
        .checked_mul(large - 1)
        .is_some_and(|frobenius| gap >= frobenius)
    {
        return true;
    }
    (0..small)
        .map_while(|k| k.checked_mul(large).filter(|&used| used <= gap))
        .any(|used| (gap - used) % small == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greedy::FirstFitScheduler;
    use crate::instance::{Instance, Job};
    use crate::verify::SolutionVerifier;
    use proptest::prelude::*;

    #[test]
    fn test_gap_scores() {
        assert_eq!(gap_score(None, 2, 3), 3);
        assert_eq!(gap_score(Some(0), 2, 3), 3);
        assert_eq!(gap_score(Some(1), 2, 3), 0);
        assert_eq!(gap_score(Some(4), 2, 3), 2);
        assert_eq!(gap_score(Some(7), 2, 3), 2);
        assert_eq!(gap_score(Some(5), 2, 2), 0);
        assert_eq!(gap_score(Some(10), 4, 6), 2);
        assert_eq!(gap_score(Some(2), 4, 6), 0);
    }

    #[test]
    fn test_fillable_large_gaps() {
        assert!(fillable(i64::MAX - 1, 2, 4));
        assert!(!fillable(i64::MAX, 2, 4));
        assert!(fillable(1_000_000_000_000, 999_983, 1_000_003));
        assert!(!fillable(999_982, 999_983, 1_000_003));
    }

    #[test]
    fn test_prefers_tight_slot_over_earliest() {
        // Job 0 is rigid on [10, 14). Job 1 needs [T, T + 2) and then
        // [S, S + 2) with S in [T + 2, T + 4].
        let instance = Instance::new(
            Params::new(2, 2, 0),
            vec![Job::new(10, 11, 0, 2), Job::new(1, 20, 0, 4)],
        );
        let validated = instance.validate().unwrap();

        // First fit takes T = 1 and leaves an unfillable 5-slot hole before 10.
        let first_fit = FirstFitScheduler::schedule(&validated, JobOrder::Input);
        assert_eq!(first_fit.assignments[1], Assignment::new(1, 1, 3, 1));

        // Best fit packs both doses right behind job 0.
        let best_fit = BestFitScheduler::schedule(&validated, JobOrder::Input);
        assert_eq!(best_fit.machines, 1);
        assert_eq!(best_fit.assignments[0], Assignment::new(10, 1, 12, 1));
        assert_eq!(best_fit.assignments[1], Assignment::new(14, 1, 16, 1));
        assert!(SolutionVerifier::verify_solution(&instance, &best_fit).is_valid());
    }

    #[test]
    fn test_opens_machine_when_nothing_fits() {
        let instance = Instance::new(
            Params::new(2, 1, 0),
            vec![Job::new(1, 2, 0, 1), Job::new(1, 2, 0, 1)],
        );
        let solution = BestFitScheduler::schedule(&instance.validate().unwrap(), JobOrder::Input);
        assert_eq!(solution.machines, 2);
        assert!(SolutionVerifier::verify_solution(&instance, &solution).is_valid());
    }

    #[test]
    fn test_huge_windows() {
        let job = Job::new(0, i64::MAX - 100, 0, 1);
        let instance = Instance::new(Params::new(1, 1, 0), vec![job, job]);
        let solution = BestFitScheduler::schedule(&instance.validate().unwrap(), JobOrder::TightestWindow);
        assert_eq!(solution.machines, 1);
        assert!(SolutionVerifier::verify_solution(&instance, &solution).is_valid());
    }

    proptest! {
        #[test]
        fn prop_best_fit_is_valid(
            jobs in prop::collection::vec((0i64..20, 0i64..12, 0i64..4, 0i64..5), 0..8),
            p1 in 1i64..4, p2 in 1i64..4, gap in 0i64..3,
        ) {
            let jobs: Vec<Job> = jobs
                .into_iter()
                .map(|(r, span, x, extra)| Job::new(r, r + p1 - 1 + span, x, p2 + extra))
                .collect();
            let instance = Instance::new(Params::new(p1, p2, gap), jobs);
            let validated = instance.validate().unwrap();
            for order in [JobOrder::Input, JobOrder::EarliestRelease, JobOrder::TightestWindow] {
                let solution = BestFitScheduler::schedule(&validated, order);
                prop_assert!(SolutionVerifier::verify_solution(&instance, &solution).is_valid());
            }
        }
    }
}
