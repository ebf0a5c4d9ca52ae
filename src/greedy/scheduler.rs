//! First-fit scheduling loop.

use super::calendar::MachineCalendar;
use crate::instance::{Assignment, Solution, ValidatedInstance, WindowedJob};
use tracing::debug;

/// Order in which jobs are handed to the first-fit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobOrder {
    /// Input order, as an online desk would see them.
    #[default]
    Input,
    /// Ascending release `r`, ties in input order.
    EarliestRelease,
    /// Fewest dose-1 start options first, ties by release.
    TightestWindow,
}

/// Builds a valid schedule greedily.
///
/// # Examples
///
/// ```
/// use u_doseplan::greedy::{FirstFitScheduler, JobOrder};
/// use u_doseplan::instance::{Instance, Job, Params};
///
/// let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(1, 1, 0, 1)]);
/// let validated = instance.validate().unwrap();
/// let solution = FirstFitScheduler::schedule(&validated, JobOrder::Input);
/// assert_eq!(solution.machines, 1);
/// assert_eq!(solution.assignments[0].second_start, 2);
/// ```
pub struct FirstFitScheduler;

impl FirstFitScheduler {
    /// Schedules every job; machine indices in the result are 1-based.
    pub fn schedule(instance: &ValidatedInstance, order: JobOrder) -> Solution {
        let p1 = instance.params.p1;
        let p2 = instance.params.p2;
        let mut calendar = MachineCalendar::new();
        let mut assignments = vec![Assignment::new(0, 0, 0, 0); instance.jobs.len()];

        for index in job_order(&instance.jobs, order) {
            let job = &instance.jobs[index];
            let (t, m1, s, m2) = place(&mut calendar, job, p1, p2);
            assignments[index] = Assignment::new(t, m1 + 1, s, m2 + 1);
        }

        debug!(
            jobs = instance.jobs.len(),
            machines = calendar.len(),
            ?order,
            "first-fit schedule built"
        );
        Solution::new(assignments, calendar.len())
    }
}

pub(super) fn job_order(jobs: &[WindowedJob], order: JobOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..jobs.len()).collect();
    match order {
        JobOrder::Input => {}
        JobOrder::EarliestRelease => indices.sort_by_key(|&i| jobs[i].job.release),
        JobOrder::TightestWindow => indices.sort_by_key(|&i| {
            let w = &jobs[i].window;
            (w.last[0].abs_diff(w.first[0]), jobs[i].job.release)
        }),
    }
    indices
}

fn overlaps(a: i64, a_len: i64, b: i64, b_len: i64) -> bool {
    a < b + b_len && b < a + a_len
}

/// Places both doses of one job and returns `(T, m1, S, m2)` with 0-based
/// machines.
fn place(calendar: &mut MachineCalendar, job: &WindowedJob, p1: i64, p2: i64) -> (i64, usize, i64, usize) {
    let w = &job.window;

    let mut first_candidates = vec![w.first[0]];
    first_candidates.extend(calendar.ends_within(w.first[0], w.last[0]));

    for t in first_candidates {
        let Some(m1) = calendar.lowest_free(t, t + p1) else {
            continue;
        };
        if let Some((s, m2)) = second_slot(calendar, job, t, m1, p1, p2) {
            calendar.book(m1, t, t + p1);
            calendar.book(m2, s, s + p2);
            return (t, m1, s, m2);
        }
    }

    // Nothing fits on the opened machines: earliest dose-1 start, opening
    // machines as needed.
    let t = w.first[0];
    let m1 = calendar
        .lowest_free(t, t + p1)
        .unwrap_or_else(|| calendar.open());
    let (s, m2) = match second_slot(calendar, job, t, m1, p1, p2) {
        Some(found) => found,
        None => (t + w.anchor_min, calendar.open()),
    };
    calendar.book(m1, t, t + p1);
    calendar.book(m2, s, s + p2);
    (t, m1, s, m2)
}

/// Earliest dose-2 start on an opened machine, given dose 1 at `t` on `m1`
/// (not yet booked).
fn second_slot(
    calendar: &MachineCalendar,
    job: &WindowedJob,
    t: i64,
    m1: usize,
    p1: i64,
    p2: i64,
) -> Option<(i64, usize)> {
    let s_lo = t + job.window.anchor_min;
    let s_hi = t + job.window.anchor_max;
    let mut candidates = vec![s_lo];
    candidates.extend(calendar.ends_within(s_lo, s_hi));
    // Dose 1 itself may free the machine it sits on.
    if (s_lo + 1..=s_hi).contains(&(t + p1)) {
        candidates.push(t + p1);
        candidates.sort_unstable();
        candidates.dedup();
    }

    candidates.into_iter().find_map(|s| {
        let no_self_clash = |m: usize| !(m == m1 && overlaps(t, p1, s, p2));
        calendar
            .lowest_free_where(s, s + p2, no_self_clash)
            .map(|m2| (s, m2))
    })
}
