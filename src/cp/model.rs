//! CP model definition.

use super::variables::{BoolVar, IntVar, IntervalVar};
use crate::error::ModelError;
use std::collections::HashSet;

/// A constraint in the CP model.
///
/// Boolean variables may appear anywhere an integer variable may, taking
/// the values 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Linear range: `lower <= Σ coefficient · var <= upper`.
    Linear {
        /// (variable_name, coefficient) pairs.
        terms: Vec<(String, i64)>,
        /// Inclusive lower bound.
        lower: i64,
        /// Inclusive upper bound.
        upper: i64,
    },

    /// Two-dimensional non-overlap.
    ///
    /// Rectangle `i` spans `x_intervals[i] × y_intervals[i]`. No two
    /// rectangles may overlap on both axes at once.
    NoOverlap2D {
        x_intervals: Vec<String>,
        y_intervals: Vec<String>,
    },

    /// `target = max(vars)`.
    MaxEquality { target: String, vars: Vec<String> },
}

/// Objective function for the CP model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Minimize a linear combination of variables.
    Minimize {
        /// (variable_name, coefficient) pairs.
        terms: Vec<(String, i64)>,
    },

    /// Maximize a linear combination of variables.
    Maximize {
        /// (variable_name, coefficient) pairs.
        terms: Vec<(String, i64)>,
    },
}

impl Objective {
    /// Minimize a single variable.
    pub fn minimize(var: impl Into<String>) -> Self {
        Objective::Minimize {
            terms: vec![(var.into(), 1)],
        }
    }

    /// The objective's terms, regardless of sense.
    pub fn terms(&self) -> &[(String, i64)] {
        match self {
            Objective::Minimize { terms } | Objective::Maximize { terms } => terms,
        }
    }
}

/// A constraint programming model.
///
/// Contains variables, constraints, and an optional objective function.
/// Variables keep their declaration order, which solvers may use for
/// deterministic branching.
///
/// # Examples
///
/// ```
/// use u_doseplan::cp::{CpModel, IntVar, IntervalVar, Objective};
///
/// let mut model = CpModel::new("example", 100);
/// model.add_int_var(IntVar::new("T", 0, 10));
/// model.add_int_var(IntVar::new("m", 1, 2));
/// model.add_interval(IntervalVar::new("dose", "T", 3));
/// model.add_interval(IntervalVar::new("machine", "m", 1));
/// model.add_no_overlap_2d(vec!["dose".into()], vec!["machine".into()]);
/// model.set_objective(Objective::minimize("m"));
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Integer variables.
    pub int_vars: Vec<IntVar>,
    /// Boolean variables.
    pub bool_vars: Vec<BoolVar>,
    /// Interval variables.
    pub intervals: Vec<IntervalVar>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
    /// Planning horizon (last timeslot considered).
    pub horizon: i64,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            int_vars: Vec::new(),
            bool_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            horizon,
        }
    }

    /// Adds an integer variable.
    pub fn add_int_var(&mut self, var: IntVar) {
        self.int_vars.push(var);
    }

    /// Adds a boolean variable.
    pub fn add_bool_var(&mut self, var: BoolVar) {
        self.bool_vars.push(var);
    }

    /// Adds an interval variable.
    pub fn add_interval(&mut self, var: IntervalVar) {
        self.intervals.push(var);
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add `lower <= Σ terms <= upper`.
    pub fn add_linear(&mut self, terms: Vec<(String, i64)>, lower: i64, upper: i64) {
        self.constraints.push(Constraint::Linear {
            terms,
            lower,
            upper,
        });
    }

    /// Convenience: add `Σ terms = value`.
    pub fn add_linear_eq(&mut self, terms: Vec<(String, i64)>, value: i64) {
        self.add_linear(terms, value, value);
    }

    /// Convenience: add a 2-D no-overlap constraint.
    pub fn add_no_overlap_2d(&mut self, x_intervals: Vec<String>, y_intervals: Vec<String>) {
        self.constraints.push(Constraint::NoOverlap2D {
            x_intervals,
            y_intervals,
        });
    }

    /// Convenience: add `target = max(vars)`.
    pub fn add_max_equality(&mut self, target: String, vars: Vec<String>) {
        self.constraints.push(Constraint::MaxEquality { target, vars });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that names are unique, domains are non-empty, and every
    /// referenced variable or interval exists.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut vars: HashSet<&str> = HashSet::new();
        for v in &self.int_vars {
            if v.max < v.min {
                return Err(ModelError::EmptyDomain {
                    name: v.name.clone(),
                    min: v.min,
                    max: v.max,
                });
            }
            if !vars.insert(v.name.as_str()) {
                return Err(ModelError::DuplicateName(v.name.clone()));
            }
        }
        for v in &self.bool_vars {
            if !vars.insert(v.name.as_str()) {
                return Err(ModelError::DuplicateName(v.name.clone()));
            }
        }

        let mut intervals: HashSet<&str> = HashSet::new();
        for iv in &self.intervals {
            if !intervals.insert(iv.name.as_str()) {
                return Err(ModelError::DuplicateName(iv.name.clone()));
            }
            if iv.size < 0 {
                return Err(ModelError::NegativeSize(iv.name.clone()));
            }
            if !vars.contains(iv.start.as_str()) {
                return Err(ModelError::UndefinedVariable(iv.start.clone()));
            }
        }

        let check_var = |name: &String| -> Result<(), ModelError> {
            if vars.contains(name.as_str()) {
                Ok(())
            } else {
                Err(ModelError::UndefinedVariable(name.clone()))
            }
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::Linear { terms, .. } => {
                    for (name, _) in terms {
                        check_var(name)?;
                    }
                }
                Constraint::NoOverlap2D {
                    x_intervals,
                    y_intervals,
                } => {
                    if x_intervals.len() != y_intervals.len() {
                        return Err(ModelError::LengthMismatch {
                            x: x_intervals.len(),
                            y: y_intervals.len(),
                        });
                    }
                    for name in x_intervals.iter().chain(y_intervals) {
                        if !intervals.contains(name.as_str()) {
                            return Err(ModelError::UndefinedInterval(name.clone()));
                        }
                    }
                }
                Constraint::MaxEquality { target, vars } => {
                    check_var(target)?;
                    for name in vars {
                        check_var(name)?;
                    }
                }
            }
        }

        if let Some(objective) = &self.objective {
            for (name, _) in objective.terms() {
                check_var(name)?;
            }
        }

        Ok(())
    }

    /// Returns the number of integer plus boolean variables.
    pub fn variable_count(&self) -> usize {
        self.int_vars.len() + self.bool_vars.len()
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Looks up an integer variable by name.
    pub fn int_var(&self, name: &str) -> Option<&IntVar> {
        self.int_vars.iter().find(|v| v.name == name)
    }
}
