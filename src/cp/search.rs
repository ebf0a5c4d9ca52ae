//! Exhaustive branch-and-bound solver.

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, IntervalSolution, SolverConfig, SolverStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Domains wider than this are split in halves instead of enumerated.
const SPLIT_THRESHOLD: i64 = 16;

/// A small exact CP solver.
///
/// Depth-first search over variable bounds with propagation of linear
/// ranges, max-equalities and 2-D no-overlap, plus branch-and-bound on the
/// objective. Objective variables are branched first, smallest value
/// first, so the first solution of a single-variable minimization is
/// usually already optimal and the rest of the search only proves it.
///
/// # Limitations
///
/// - Bounds consistency only: holes inside a domain are not represented
/// - Single-threaded: `num_workers` is ignored
/// - Exponential in the worst case; meant for small models and tests
pub struct BacktrackingSolver {
    /// Nodes between two clock/cancellation checks.
    check_interval: u64,
}

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self {
            check_interval: 64,
        }
    }

    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }
}

impl Default for BacktrackingSolver {
    fn default() -> Self {
        Self::new()
    }
}

type Domains = Vec<(i64, i64)>;

struct Linear {
    terms: Vec<(usize, i64)>,
    lower: i64,
    upper: i64,
}

struct MaxEq {
    target: usize,
    vars: Vec<usize>,
}

#[derive(Clone, Copy)]
struct Rect {
    x: usize,
    x_size: i64,
    y: usize,
    y_size: i64,
}

/// The model translated to dense indices.
struct Compiled {
    names: Vec<String>,
    bool_count_from: usize,
    initial: Domains,
    linear: Vec<Linear>,
    max_eq: Vec<MaxEq>,
    groups: Vec<Vec<Rect>>,
    /// Objective in minimization form.
    objective: Option<Vec<(usize, i64)>>,
    negate_objective: bool,
    order: Vec<usize>,
    intervals: Vec<(String, usize, i64)>,
}

impl Compiled {
    fn new(model: &CpModel) -> Self {
        let mut names = Vec::with_capacity(model.variable_count());
        let mut initial = Vec::with_capacity(model.variable_count());
        for v in &model.int_vars {
            names.push(v.name.clone());
            initial.push(match v.fixed {
                Some(x) => (x, x),
                None => (v.min, v.max),
            });
        }
        let bool_count_from = names.len();
        for v in &model.bool_vars {
            names.push(v.name.clone());
            initial.push(v.bounds());
        }

        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        let interval_index: HashMap<&str, (usize, i64)> = model
            .intervals
            .iter()
            .map(|iv| (iv.name.as_str(), (index[iv.start.as_str()], iv.size)))
            .collect();
        let terms_of = |terms: &[(String, i64)]| -> Vec<(usize, i64)> {
            terms
                .iter()
                .filter(|(_, c)| *c != 0)
                .map(|(n, c)| (index[n.as_str()], *c))
                .collect()
        };

        let mut linear = Vec::new();
        let mut max_eq = Vec::new();
        let mut groups = Vec::new();
        for constraint in &model.constraints {
            match constraint {
                Constraint::Linear {
                    terms,
                    lower,
                    upper,
                } => linear.push(Linear {
                    terms: terms_of(terms),
                    lower: *lower,
                    upper: *upper,
                }),
                Constraint::MaxEquality { target, vars } => max_eq.push(MaxEq {
                    target: index[target.as_str()],
                    vars: vars.iter().map(|n| index[n.as_str()]).collect(),
                }),
                Constraint::NoOverlap2D {
                    x_intervals,
                    y_intervals,
                } => groups.push(
                    x_intervals
                        .iter()
                        .zip(y_intervals)
                        .map(|(x, y)| {
                            let (x, x_size) = interval_index[x.as_str()];
                            let (y, y_size) = interval_index[y.as_str()];
                            Rect {
                                x,
                                x_size,
                                y,
                                y_size,
                            }
                        })
                        .collect(),
                ),
            }
        }

        let (objective, negate_objective) = match &model.objective {
            Some(Objective::Minimize { terms }) => (Some(terms_of(terms)), false),
            Some(Objective::Maximize { terms }) => (
                Some(terms_of(terms).into_iter().map(|(v, c)| (v, -c)).collect()),
                true,
            ),
            None => (None, false),
        };

        let mut order: Vec<usize> = Vec::with_capacity(names.len());
        if let Some(terms) = &objective {
            for &(v, _) in terms {
                if !order.contains(&v) {
                    order.push(v);
                }
            }
        }
        let head = order.clone();
        order.extend((0..names.len()).filter(|v| !head.contains(v)));

        let intervals = model
            .intervals
            .iter()
            .map(|iv| (iv.name.clone(), index[iv.start.as_str()], iv.size))
            .collect();

        Self {
            names,
            bool_count_from,
            initial,
            linear,
            max_eq,
            groups,
            objective,
            negate_objective,
            order,
            intervals,
        }
    }

    fn objective_value(&self, domains: &Domains) -> Option<i64> {
        self.objective
            .as_ref()
            .map(|terms| terms.iter().map(|&(v, c)| c * domains[v].0).sum())
    }

    /// Runs all propagators to a fixpoint. Returns `false` on a conflict.
    fn propagate(&self, d: &mut Domains, bound: Option<i64>) -> bool {
        loop {
            let mut changed = false;

            if let (Some(terms), Some(ub)) = (&self.objective, bound) {
                if !linear_bounds(terms, i64::MIN, ub, d, &mut changed) {
                    return false;
                }
            }
            for lin in &self.linear {
                if !linear_bounds(&lin.terms, lin.lower, lin.upper, d, &mut changed) {
                    return false;
                }
            }
            for max in &self.max_eq {
                if !max_bounds(max, d, &mut changed) {
                    return false;
                }
            }
            for group in &self.groups {
                if !no_overlap_bounds(group, d, &mut changed) {
                    return false;
                }
            }

            if !changed {
                return true;
            }
        }
    }

    fn select(&self, d: &Domains) -> Option<usize> {
        self.order.iter().copied().find(|&v| d[v].0 < d[v].1)
    }
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

fn clamp_i64(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Tightens `d[v]` to `[lo, hi]`. Returns `false` when the domain empties.
fn tighten(d: &mut Domains, v: usize, lo: i64, hi: i64, changed: &mut bool) -> bool {
    let (cur_lo, cur_hi) = d[v];
    let new_lo = cur_lo.max(lo);
    let new_hi = cur_hi.min(hi);
    if new_lo > new_hi {
        return false;
    }
    if new_lo != cur_lo || new_hi != cur_hi {
        d[v] = (new_lo, new_hi);
        *changed = true;
    }
    true
}

fn linear_bounds(
    terms: &[(usize, i64)],
    lower: i64,
    upper: i64,
    d: &mut Domains,
    changed: &mut bool,
) -> bool {
    let contribution = |v: usize, c: i64, d: &Domains| -> (i128, i128) {
        let (lo, hi) = d[v];
        let (a, b) = (c as i128 * lo as i128, c as i128 * hi as i128);
        (a.min(b), a.max(b))
    };

    let mut min_sum: i128 = 0;
    let mut max_sum: i128 = 0;
    for &(v, c) in terms {
        let (lo, hi) = contribution(v, c, d);
        min_sum += lo;
        max_sum += hi;
    }
    let (lower, upper) = (lower as i128, upper as i128);
    if min_sum > upper || max_sum < lower {
        return false;
    }

    for &(v, c) in terms {
        let (c_lo, c_hi) = contribution(v, c, d);
        let rest_min = min_sum - c_lo;
        let rest_max = max_sum - c_hi;
        // c · v ∈ [lower - rest_max, upper - rest_min]
        let cv_lo = lower - rest_max;
        let cv_hi = upper - rest_min;
        let c = c as i128;
        let (lo, hi) = if c > 0 {
            (ceil_div(cv_lo, c), floor_div(cv_hi, c))
        } else {
            (ceil_div(cv_hi, c), floor_div(cv_lo, c))
        };
        if !tighten(d, v, clamp_i64(lo), clamp_i64(hi), changed) {
            return false;
        }
    }
    true
}

fn max_bounds(max: &MaxEq, d: &mut Domains, changed: &mut bool) -> bool {
    if max.vars.is_empty() {
        return true;
    }
    let max_lo = max.vars.iter().map(|&v| d[v].0).max().unwrap_or(i64::MIN);
    let max_hi = max.vars.iter().map(|&v| d[v].1).max().unwrap_or(i64::MIN);
    if !tighten(d, max.target, max_lo, max_hi, changed) {
        return false;
    }

    let (t_lo, t_hi) = d[max.target];
    for &v in &max.vars {
        if !tighten(d, v, i64::MIN, t_hi, changed) {
            return false;
        }
    }

    // A single variable able to reach the target's lower bound must do so.
    let mut supports = max.vars.iter().copied().filter(|&v| d[v].1 >= t_lo);
    match (supports.next(), supports.next()) {
        (None, _) => false,
        (Some(v), None) => tighten(d, v, t_lo, i64::MAX, changed),
        _ => true,
    }
}

fn overlaps(a_start: i64, a_size: i64, b_start: i64, b_size: i64) -> bool {
    a_start < b_start + b_size && b_start < a_start + a_size
}

/// Pushes `other` out of the half-open range occupied by a fixed interval.
fn push_out(
    d: &mut Domains,
    fixed_start: i64,
    fixed_size: i64,
    other: usize,
    other_size: i64,
    changed: &mut bool,
) -> bool {
    // other may not start in [fixed_start - other_size + 1, fixed_start + fixed_size - 1]
    let forbid_lo = fixed_start - other_size + 1;
    let forbid_hi = fixed_start + fixed_size - 1;
    let (lo, hi) = d[other];
    let new_lo = if (forbid_lo..=forbid_hi).contains(&lo) {
        forbid_hi + 1
    } else {
        lo
    };
    let new_hi = if (forbid_lo..=forbid_hi).contains(&hi) {
        forbid_lo - 1
    } else {
        hi
    };
    tighten(d, other, new_lo, new_hi, changed)
}

fn fixed(v: usize, d: &Domains) -> Option<i64> {
    (d[v].0 == d[v].1).then_some(d[v].0)
}

fn no_overlap_bounds(rects: &[Rect], d: &mut Domains, changed: &mut bool) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            let (a, b) = (rects[i], rects[j]);
            if a.x_size == 0 || b.x_size == 0 || a.y_size == 0 || b.y_size == 0 {
                continue;
            }
            let y_clash = match (fixed(a.y, d), fixed(b.y, d)) {
                (Some(ya), Some(yb)) => overlaps(ya, a.y_size, yb, b.y_size),
                _ => false,
            };
            let x_clash = match (fixed(a.x, d), fixed(b.x, d)) {
                (Some(xa), Some(xb)) => overlaps(xa, a.x_size, xb, b.x_size),
                _ => false,
            };
            if x_clash && y_clash {
                return false;
            }

            if y_clash {
                if let Some(xa) = fixed(a.x, d) {
                    if !push_out(d, xa, a.x_size, b.x, b.x_size, changed) {
                        return false;
                    }
                }
                if let Some(xb) = fixed(b.x, d) {
                    if !push_out(d, xb, b.x_size, a.x, a.x_size, changed) {
                        return false;
                    }
                }
            }
            if x_clash {
                if let Some(ya) = fixed(a.y, d) {
                    if !push_out(d, ya, a.y_size, b.y, b.y_size, changed) {
                        return false;
                    }
                }
                if let Some(yb) = fixed(b.y, d) {
                    if !push_out(d, yb, b.y_size, a.y, a.y_size, changed) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Limit,
    Done,
}

struct Search<'a> {
    compiled: &'a Compiled,
    config: &'a SolverConfig,
    check_interval: u64,
    deadline: Instant,
    cancel: Option<Arc<AtomicBool>>,
    nodes: u64,
    incumbent: Option<(Domains, Option<i64>)>,
    bound: Option<i64>,
    stop: Option<Stop>,
}

impl Search<'_> {
    fn out_of_budget(&self) -> bool {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        Instant::now() >= self.deadline
    }

    fn dfs(&mut self, mut domains: Domains) {
        self.nodes += 1;
        if self.nodes % self.check_interval == 0 && self.out_of_budget() {
            self.stop = Some(Stop::Limit);
            return;
        }

        if !self.compiled.propagate(&mut domains, self.bound) {
            return;
        }

        let Some(var) = self.compiled.select(&domains) else {
            let value = self.compiled.objective_value(&domains);
            debug!(objective = ?value, nodes = self.nodes, "solution found");
            self.incumbent = Some((domains, value));
            match value {
                Some(v) if !self.config.stop_after_first => self.bound = Some(v - 1),
                _ => self.stop = Some(Stop::Done),
            }
            return;
        };

        let (lo, hi) = domains[var];
        if hi - lo > SPLIT_THRESHOLD {
            let mid = lo + (hi - lo) / 2;
            for (a, b) in [(lo, mid), (mid + 1, hi)] {
                let mut child = domains.clone();
                child[var] = (a, b);
                self.dfs(child);
                if self.stop.is_some() {
                    return;
                }
            }
        } else {
            for value in lo..=hi {
                let mut child = domains.clone();
                child[var] = (value, value);
                self.dfs(child);
                if self.stop.is_some() {
                    return;
                }
            }
        }
    }
}

impl CpSolver for BacktrackingSolver {
    fn solve_with_cancel(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CpSolution {
        if let Err(err) = model.validate() {
            warn!(%err, model = %model.name, "rejecting invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Err(err) = config.validate() {
            warn!(%err, "rejecting invalid solver configuration");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = Instant::now();
        let compiled = Compiled::new(model);
        let mut search = Search {
            compiled: &compiled,
            config,
            check_interval: self.check_interval,
            deadline: start_time + Duration::from_millis(config.time_limit_ms as u64),
            cancel,
            nodes: 0,
            incumbent: None,
            bound: None,
            stop: None,
        };

        if search.out_of_budget() {
            search.stop = Some(Stop::Limit);
        } else {
            search.dfs(compiled.initial.clone());
        }

        let exhausted = search.stop != Some(Stop::Limit);
        let status = match (&search.incumbent, exhausted) {
            (Some(_), true) if config.stop_after_first && compiled.objective.is_some() => {
                SolverStatus::Feasible
            }
            (Some(_), true) => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Infeasible,
            (None, false) => SolverStatus::Timeout,
        };

        let mut solution = CpSolution::empty(status);
        solution.nodes = search.nodes;
        if let Some((values, objective)) = search.incumbent {
            for (i, name) in compiled.names.iter().enumerate() {
                let v = values[i].0;
                if i >= compiled.bool_count_from {
                    solution.bool_vars.insert(name.clone(), v != 0);
                } else {
                    solution.int_vars.insert(name.clone(), v);
                }
            }
            for (name, start, size) in &compiled.intervals {
                let start = values[*start].0;
                solution.intervals.insert(
                    name.clone(),
                    IntervalSolution {
                        start,
                        end: start + size,
                        size: *size,
                    },
                );
            }
            solution.objective_value = objective.map(|v| {
                if compiled.negate_objective {
                    -v
                } else {
                    v
                }
            });
        }
        solution.solve_time_ms = start_time.elapsed().as_millis() as i64;

        debug!(
            model = %model.name,
            status = ?solution.status,
            objective = ?solution.objective_value,
            nodes = solution.nodes,
            "search finished"
        );
        solution
    }
}
