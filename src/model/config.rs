//! Model build configuration and encoding choice.

/// How the scheduling problem is expressed as a CP model.
///
/// # References
///
/// - Time-indexed: Sousa & Wolsey (1992), one binary per (operation, start)
/// - Interval: Laborie et al. (2018), interval variables with 2-D no-overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// One binary per candidate start slot; per-timeslot capacity rows
    /// bound the number of busy machines by `M`.
    ///
    /// Size grows with the summed window widths.
    TimeIndexed,

    /// Time-indexed, plus one binary per (start slot, machine) so every
    /// operation carries an explicit machine index.
    TimeIndexedWithMachines,

    /// Integer start times with fixed-size interval variables and a single
    /// no-overlap over (time, machine) rectangles.
    ///
    /// Size is independent of window widths.
    Interval,
}

impl Encoding {
    /// Short name used in model names and reports.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::TimeIndexed => "time-indexed",
            Encoding::TimeIndexedWithMachines => "time-indexed-machines",
            Encoding::Interval => "interval",
        }
    }

    /// Whether decoded schedules carry machine identities from the solver.
    pub fn has_machine_identity(self) -> bool {
        !matches!(self, Encoding::TimeIndexed)
    }
}

/// Configuration for [`ModelBuilder`](super::ModelBuilder).
///
/// # Examples
///
/// ```
/// use u_doseplan::model::{BuildConfig, Encoding};
///
/// let config = BuildConfig::default()
///     .with_encoding(Encoding::Interval)
///     .with_machine_limit(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildConfig {
    /// Fixed encoding. `None` chooses by instance size.
    pub encoding: Option<Encoding>,

    /// Largest summed window size (start slots over all operations) for
    /// which the automatic choice still picks [`Encoding::TimeIndexed`].
    pub max_time_indexed_cells: u64,

    /// Upper bound on machine indices. `None` uses the first-fit
    /// machine count.
    pub machine_limit: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            encoding: None,
            max_time_indexed_cells: 10_000,
            machine_limit: None,
        }
    }
}

impl BuildConfig {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_max_time_indexed_cells(mut self, cells: u64) -> Self {
        self.max_time_indexed_cells = cells;
        self
    }

    pub fn with_machine_limit(mut self, limit: usize) -> Self {
        self.machine_limit = Some(limit);
        self
    }

    /// Resolves the encoding for an instance with `cells` start slots.
    pub fn resolve(&self, cells: u64) -> Encoding {
        match self.encoding {
            Some(encoding) => encoding,
            None if cells <= self.max_time_indexed_cells => Encoding::TimeIndexed,
            None => Encoding::Interval,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.machine_limit == Some(0) {
            return Err("machine_limit must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = BuildConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encoding, None);
    }

    #[test]
    fn test_zero_machine_limit_rejected() {
        let config = BuildConfig::default().with_machine_limit(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_by_size() {
        let config = BuildConfig::default().with_max_time_indexed_cells(100);
        assert_eq!(config.resolve(100), Encoding::TimeIndexed);
        assert_eq!(config.resolve(101), Encoding::Interval);

        let fixed = config.with_encoding(Encoding::TimeIndexedWithMachines);
        assert_eq!(fixed.resolve(1_000_000), Encoding::TimeIndexedWithMachines);
    }

    #[test]
    fn test_machine_identity() {
        assert!(!Encoding::TimeIndexed.has_machine_identity());
        assert!(Encoding::TimeIndexedWithMachines.has_machine_identity());
        assert!(Encoding::Interval.has_machine_identity());
    }
}
