//! CP variable types.

/// An integer variable with a domain [min, max].
///
/// Represents a decision variable that takes integer values within
/// the specified bounds. Can be fixed to a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    /// Variable name (unique identifier within a model).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
    /// Fixed value, if any.
    pub fixed: Option<i64>,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            fixed: None,
        }
    }

    /// Creates a fixed integer variable.
    pub fn fixed(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            min: value,
            max: value,
            fixed: Some(value),
        }
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some() || self.min == self.max
    }

    /// Domain size (max - min + 1), zero for an empty domain.
    pub fn domain_size(&self) -> u64 {
        if self.max < self.min {
            0
        } else {
            (self.max as i128 - self.min as i128 + 1) as u64
        }
    }
}

/// A boolean variable (0/1 decision).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVar {
    /// Variable name.
    pub name: String,
    /// Fixed value, if any.
    pub fixed: Option<bool>,
}

impl BoolVar {
    /// Creates a new boolean variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed: None,
        }
    }

    /// Creates a fixed boolean variable.
    pub fn fixed(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            fixed: Some(value),
        }
    }

    /// Domain as integer bounds.
    pub fn bounds(&self) -> (i64, i64) {
        match self.fixed {
            Some(v) => (v as i64, v as i64),
            None => (0, 1),
        }
    }
}

/// A fixed-size interval whose start is an integer variable.
///
/// The interval covers the half-open range `[start, start + size)`. A size
/// of zero yields an empty interval that overlaps nothing.
///
/// # Examples
///
/// ```
/// use u_doseplan::cp::IntervalVar;
///
/// let dose = IntervalVar::new("dose1_0", "T_0", 3);
/// assert_eq!(dose.start, "T_0");
/// assert_eq!(dose.end_of(10), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalVar {
    /// Interval name.
    pub name: String,
    /// Name of the integer variable holding the start.
    pub start: String,
    /// Fixed length.
    pub size: i64,
}

impl IntervalVar {
    pub fn new(name: impl Into<String>, start: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            size,
        }
    }

    /// Exclusive end for a given start value.
    pub fn end_of(&self, start: i64) -> i64 {
        start + self.size
    }
}
