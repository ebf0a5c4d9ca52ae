//! Generator configuration and placement policies.

/// Upper bound (inclusive) of the randomly drawn instance gap.
pub const GAP_UPPER_BOUND: i64 = 20;

/// Upper bound (inclusive) of each job's randomly drawn slack `x`.
pub const SLACK_UPPER_BOUND: i64 = 10;

/// How jobs are placed in time.
///
/// Every policy produces rigid jobs: one possible start per dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    /// `r` uniform in `[1, job_count]`, `d = r + p1 - 1`, `l = p2`.
    /// Jobs may pile up on the same timeslots.
    Fixed,

    /// Each job starts right after the previous job's second dose ends,
    /// so one machine always suffices.
    Consecutive,

    /// Like [`Policy::Fixed`], but a job that would push occupancy of any
    /// timeslot past `machine_max` is moved to the end of the horizon.
    ForceMachineMax {
        /// Occupancy cap per timeslot.
        machine_max: usize,
    },

    /// Like [`Policy::Fixed`] with `p1` and `p2` multiplied by
    /// `multiplier` everywhere, including the emitted instance.
    Multiplication {
        /// Duration factor, at least 1.
        multiplier: i64,
    },
}

/// Configuration for [`InstanceGenerator`](super::InstanceGenerator).
///
/// # Examples
///
/// ```
/// use u_doseplan::generator::{GeneratorConfig, Policy};
///
/// let config = GeneratorConfig::default()
///     .with_policy(Policy::ForceMachineMax { machine_max: 3 })
///     .with_durations(2, 1)
///     .with_job_count(50)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    /// Placement policy.
    pub policy: Policy,

    /// Dose-1 duration before any multiplier.
    pub p1: i64,

    /// Dose-2 duration before any multiplier.
    pub p2: i64,

    /// Number of jobs to generate.
    pub job_count: usize,

    /// Fixed gap. `None` draws it from `[0, GAP_UPPER_BOUND]`.
    pub gap: Option<i64>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Fixed,
            p1: 1,
            p2: 1,
            job_count: 10,
            gap: None,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_durations(mut self, p1: i64, p2: i64) -> Self {
        self.p1 = p1;
        self.p2 = p2;
        self
    }

    pub fn with_job_count(mut self, n: usize) -> Self {
        self.job_count = n;
        self
    }

    pub fn with_gap(mut self, gap: i64) -> Self {
        self.gap = Some(gap);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Duration factor of the policy (1 unless multiplying).
    pub fn multiplier(&self) -> i64 {
        match self.policy {
            Policy::Multiplication { multiplier } => multiplier,
            _ => 1,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.p1 <= 0 || self.p2 <= 0 {
            return Err(format!(
                "durations must be positive, got p1={} p2={}",
                self.p1, self.p2
            ));
        }
        if let Some(gap) = self.gap {
            if gap < 0 {
                return Err(format!("gap must be non-negative, got {gap}"));
            }
        }
        match self.policy {
            Policy::ForceMachineMax { machine_max: 0 } => {
                return Err("machine_max must be at least 1".into());
            }
            Policy::Multiplication { multiplier } if multiplier < 1 => {
                return Err(format!("multiplier must be at least 1, got {multiplier}"));
            }
            _ => {}
        }
        // No generated timeslot exceeds (2 * job_count + 1) * cycle.
        let k = self.multiplier();
        let cycle = self
            .p1
            .checked_mul(k)
            .zip(self.p2.checked_mul(k))
            .and_then(|(p1, p2)| p1.checked_add(p2))
            .and_then(|p| p.checked_add(self.gap.unwrap_or(GAP_UPPER_BOUND)))
            .and_then(|p| p.checked_add(SLACK_UPPER_BOUND + 1));
        let horizon = cycle
            .zip(i64::try_from(self.job_count).ok())
            .and_then(|(cycle, n)| {
                n.checked_mul(2)
                    .and_then(|n| n.checked_add(1))
                    .and_then(|n| cycle.checked_mul(n))
            });
        if horizon.is_none() {
            return Err("generated timeslots would overflow".into());
        }
        Ok(())
    }
}
