//! Window calculation.

use super::job::{Instance, Job, Operation, Params};
use crate::error::{InvalidJob, JobDefect, ScheduleError};
use tracing::debug;

/// Feasible start windows of a job.
///
/// `first`/`last` are the inclusive start bounds per operation, indexed by
/// [`Operation::index`]. The dose-2 bounds are the outer envelope over every
/// possible dose-1 start; the binding relation is
/// `T + anchor_min <= S <= T + anchor_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub first: [i64; 2],
    pub last: [i64; 2],
    /// `p1 + gap + x`
    pub anchor_min: i64,
    /// `p1 + gap + x + l - p2`
    pub anchor_max: i64,
}

impl Window {
    /// Computes the windows of `job`, rejecting jobs that can never be
    /// scheduled.
    ///
    /// ```
    /// use u_doseplan::instance::{Job, Params, Window};
    ///
    /// let w = Window::compute(&Job::new(1, 4, 2, 3), &Params::new(2, 1, 5)).unwrap();
    /// assert_eq!(w.first, [1, 10]);
    /// assert_eq!(w.last, [3, 14]);
    /// ```
    pub fn compute(job: &Job, params: &Params) -> Result<Self, JobDefect> {
        let Params { p1, p2, gap } = *params;
        let Job {
            release: r,
            deadline: d,
            slack: x,
            second_window: l,
        } = *job;

        if p1 <= 0 {
            return Err(JobDefect::NonPositiveDuration {
                operation: Operation::First,
                duration: p1,
            });
        }
        if p2 <= 0 {
            return Err(JobDefect::NonPositiveDuration {
                operation: Operation::Second,
                duration: p2,
            });
        }
        if l < p2 {
            return Err(JobDefect::SecondWindowTooShort {
                window: l,
                duration: p2,
            });
        }

        let earliest_end = r.checked_add(p1 - 1).ok_or(JobDefect::Overflow)?;
        if d < earliest_end {
            return Err(JobDefect::DeadlineTooEarly {
                release: r,
                deadline: d,
            });
        }

        let anchor_min = p1
            .checked_add(gap)
            .and_then(|v| v.checked_add(x))
            .ok_or(JobDefect::Overflow)?;
        let anchor_max = anchor_min
            .checked_add(l - p2)
            .ok_or(JobDefect::Overflow)?;

        let last_first = d
            .checked_sub(p1)
            .and_then(|v| v.checked_add(1))
            .ok_or(JobDefect::Overflow)?;
        let first_second = r.checked_add(anchor_min).ok_or(JobDefect::Overflow)?;
        // d + gap + x + l - p2 + 1 == (d - p1 + 1) + anchor_max
        let last_second = last_first
            .checked_add(anchor_max)
            .ok_or(JobDefect::Overflow)?;
        // Every processing end fits in i64.
        last_first.checked_add(p1).ok_or(JobDefect::Overflow)?;
        last_second.checked_add(p2).ok_or(JobDefect::Overflow)?;

        let window = Self {
            first: [r, first_second],
            last: [last_first, last_second],
            anchor_min,
            anchor_max,
        };

        for op in Operation::ALL {
            let i = op.index();
            if window.first[i] > window.last[i] {
                return Err(JobDefect::EmptyWindow {
                    operation: op,
                    first: window.first[i],
                    last: window.last[i],
                });
            }
        }

        Ok(window)
    }

    /// First possible start of `op`.
    pub fn first_possible(&self, op: Operation) -> i64 {
        self.first[op.index()]
    }

    /// Last possible start of `op`.
    pub fn last_possible(&self, op: Operation) -> i64 {
        self.last[op.index()]
    }

    /// Number of candidate start slots of `op`, saturating at `u64::MAX`.
    pub fn size(&self, op: Operation) -> u64 {
        self.last[op.index()]
            .abs_diff(self.first[op.index()])
            .saturating_add(1)
    }

    /// Whether `(t, s)` satisfies both the dose-1 range and the anchoring
    /// relation.
    pub fn admits(&self, t: i64, s: i64) -> bool {
        (self.first[0]..=self.last[0]).contains(&t)
            && t.checked_add(self.anchor_min).is_some_and(|lo| s >= lo)
            && t.checked_add(self.anchor_max).is_some_and(|hi| s <= hi)
    }
}

/// A job together with its cached windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowedJob {
    pub job: Job,
    pub window: Window,
}

/// An instance whose jobs all passed window validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidatedInstance {
    pub params: Params,
    pub jobs: Vec<WindowedJob>,
}

impl ValidatedInstance {
    /// Earliest dose-1 start over all jobs (`None` when empty).
    pub fn min_start(&self) -> Option<i64> {
        self.jobs.iter().map(|j| j.window.first[0]).min()
    }

    /// Latest timeslot that any operation can occupy (`None` when empty).
    pub fn max_occupied(&self) -> Option<i64> {
        self.jobs
            .iter()
            .map(|j| {
                let end_first = j.window.last[0].saturating_add(self.params.p1 - 1);
                let end_second = j.window.last[1].saturating_add(self.params.p2 - 1);
                end_first.max(end_second)
            })
            .max()
    }

    /// Sum of candidate start slots over every job and operation,
    /// saturating at `u64::MAX`.
    pub fn total_window_size(&self) -> u64 {
        self.jobs
            .iter()
            .flat_map(|j| Operation::ALL.map(|op| j.window.size(op)))
            .fold(0, u64::saturating_add)
    }
}

impl Instance {
    /// Computes every job's windows.
    ///
    /// All defective jobs are reported together; one bad job does not stop
    /// the others from being checked.
    pub fn validate(&self) -> Result<ValidatedInstance, ScheduleError> {
        let mut jobs = Vec::with_capacity(self.jobs.len());
        let mut invalid = Vec::new();

        for (index, job) in self.jobs.iter().enumerate() {
            match Window::compute(job, &self.params) {
                Ok(window) => jobs.push(WindowedJob { job: *job, window }),
                Err(defect) => invalid.push(InvalidJob { job: index, defect }),
            }
        }

        if !invalid.is_empty() {
            debug!(invalid = invalid.len(), total = self.jobs.len(), "instance rejected");
            return Err(ScheduleError::InvalidJobs(invalid));
        }

        Ok(ValidatedInstance {
            params: self.params,
            jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_bounds() {
        let params = Params::new(2, 1, 0);
        let w = Window::compute(&Job::new(1, 2, 0, 1), &params).unwrap();
        assert_eq!(w.first, [1, 3]);
        assert_eq!(w.last, [1, 3]);
        assert_eq!(w.anchor_min, 2);
        assert_eq!(w.anchor_max, 2);
    }

    #[test]
    fn test_unit_job() {
        let params = Params::new(1, 1, 0);
        let w = Window::compute(&Job::new(5, 5, 0, 1), &params).unwrap();
        assert_eq!(w.first, [5, 6]);
        assert_eq!(w.last, [5, 6]);
        assert!(w.admits(5, 6));
        assert!(!w.admits(5, 7));
    }

    #[test]
    fn test_second_window_envelope() {
        // r=10, d=14, x=3, l=6, p1=2, p2=2, gap=4
        let w = Window::compute(&Job::new(10, 14, 3, 6), &Params::new(2, 2, 4)).unwrap();
        assert_eq!(w.first[0], 10);
        assert_eq!(w.last[0], 13);
        assert_eq!(w.first[1], 10 + 2 + 4 + 3);
        assert_eq!(w.last[1], 14 + 4 + 3 + 6 - 2 + 1);
        // Envelope is reachable only from the extreme dose-1 starts.
        assert!(w.admits(13, w.last[1]));
        assert!(!w.admits(10, w.last[1]));
    }

    #[test]
    fn test_rejections() {
        let job = Job::new(1, 5, 0, 2);
        assert!(matches!(
            Window::compute(&job, &Params::new(0, 1, 0)),
            Err(JobDefect::NonPositiveDuration {
                operation: Operation::First,
                ..
            })
        ));
        assert!(matches!(
            Window::compute(&job, &Params::new(1, -1, 0)),
            Err(JobDefect::NonPositiveDuration {
                operation: Operation::Second,
                ..
            })
        ));
        assert!(matches!(
            Window::compute(&job, &Params::new(1, 3, 0)),
            Err(JobDefect::SecondWindowTooShort { window: 2, duration: 3 })
        ));
        assert!(matches!(
            Window::compute(&Job::new(4, 5, 0, 2), &Params::new(3, 1, 0)),
            Err(JobDefect::DeadlineTooEarly { release: 4, deadline: 5 })
        ));
    }

    #[test]
    fn test_deadline_exactly_fits() {
        // d == r + p1 - 1 is the tightest valid deadline.
        let w = Window::compute(&Job::new(4, 6, 0, 2), &Params::new(3, 1, 0)).unwrap();
        assert_eq!(w.first[0], w.last[0]);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let job = Job::new(i64::MAX - 1, i64::MAX, i64::MAX, 5);
        assert_eq!(
            Window::compute(&job, &Params::new(1, 1, 1)),
            Err(JobDefect::Overflow)
        );
    }

    #[test]
    fn test_processing_end_must_fit() {
        // last1 = i64::MAX, so dose 2 would end at i64::MAX + 1.
        let job = Job::new(0, i64::MAX - 1, 0, 1);
        assert_eq!(
            Window::compute(&job, &Params::new(1, 1, 0)),
            Err(JobDefect::Overflow)
        );
        assert!(Window::compute(&Job::new(0, i64::MAX - 2, 0, 1), &Params::new(1, 1, 0)).is_ok());

        // A negative gap pulls dose 2 back, but dose 1 still ends at d + 1.
        assert_eq!(
            Window::compute(&Job::new(0, i64::MAX, 0, 1), &Params::new(1, 1, -5)),
            Err(JobDefect::Overflow)
        );
    }

    #[test]
    fn test_window_sizes_saturate() {
        let params = Params::new(1, 1, 0);
        let wide = Job::new(i64::MIN / 2 - 10, i64::MAX / 2 + 10, 0, 1);
        let w = Window::compute(&wide, &params).unwrap();
        // The span exceeds i64::MAX but still fits in u64.
        assert!(w.size(Operation::First) > i64::MAX as u64);
        assert_eq!(
            w.size(Operation::First),
            (i64::MAX / 2 + 10).abs_diff(i64::MIN / 2 - 10) + 1
        );

        let instance = Instance::new(params, vec![wide, wide]);
        assert_eq!(instance.validate().unwrap().total_window_size(), u64::MAX);
    }

    #[test]
    fn test_validate_collects_all_defects() {
        let instance = Instance::new(
            Params::new(2, 2, 0),
            vec![
                Job::new(1, 2, 0, 2),
                Job::new(5, 5, 0, 2),
                Job::new(1, 4, 0, 1),
            ],
        );
        match instance.validate() {
            Err(ScheduleError::InvalidJobs(jobs)) => {
                let indices: Vec<usize> = jobs.iter().map(|j| j.job).collect();
                assert_eq!(indices, vec![1, 2]);
            }
            other => panic!("expected InvalidJobs, got {other:?}"),
        }
    }

    #[test]
    fn test_validated_extents() {
        let instance = Instance::new(
            Params::new(2, 1, 1),
            vec![Job::new(1, 3, 0, 2), Job::new(4, 5, 2, 1)],
        );
        let validated = instance.validate().unwrap();
        assert_eq!(validated.min_start(), Some(1));
        // job 1: last[1] = 5 + 1 + 2 + 1 - 1 + 1 = 9, occupies through 9
        assert_eq!(validated.max_occupied(), Some(9));
        // job 0: 2 + 3 slots, job 1: 1 + 1 slots
        assert_eq!(validated.total_window_size(), 7);
    }

    proptest! {
        #[test]
        fn prop_accepted_windows_are_ordered(
            r in -50i64..50, span in -5i64..20, x in 0i64..10, l in 0i64..10,
            p1 in -1i64..6, p2 in -1i64..6, gap in 0i64..10,
        ) {
            let job = Job::new(r, r + span, x, l);
            let params = Params::new(p1, p2, gap);
            let should_reject = p1 <= 0 || p2 <= 0 || l < p2 || r + span < r + p1 - 1;
            match Window::compute(&job, &params) {
                Ok(w) => {
                    prop_assert!(!should_reject);
                    prop_assert!(w.first[0] <= w.last[0]);
                    prop_assert!(w.first[1] <= w.last[1]);
                    prop_assert_eq!(w.first[1], w.first[0] + w.anchor_min);
                    prop_assert_eq!(w.last[1], w.last[0] + w.anchor_max);
                }
                Err(_) => prop_assert!(should_reject),
            }
        }
    }
}
