//! Reading schedules back out of solver answers.

use super::builder::{BuiltModel, OBJECTIVE};
use crate::cp::CpSolution;
use crate::error::ScheduleError;
use crate::instance::{Assignment, Solution};

impl BuiltModel {
    /// Converts a solver answer into per-job assignments.
    ///
    /// Encodings without machine identity get machines by interval-graph
    /// colouring in start order, which never needs more machines than the
    /// peak number of simultaneous operations.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::SolverFailure`] when the answer lacks a variable of
    /// the model or holds values no valid solution could have.
    pub fn decode(&self, solution: &CpSolution) -> Result<Solution, ScheduleError> {
        let read = |name: &str| {
            solution
                .value(name)
                .ok_or_else(|| ScheduleError::SolverFailure(format!("answer has no value for `{name}`")))
        };
        let machine = |name: &str| {
            let value = read(name)?;
            usize::try_from(value)
                .ok()
                .filter(|&m| m >= 1)
                .ok_or_else(|| ScheduleError::SolverFailure(format!("`{name}` = {value} is not a machine")))
        };

        let claimed = machine(OBJECTIVE)?;
        let mut starts = Vec::with_capacity(self.jobs.len());
        for vars in &self.jobs {
            starts.push((read(&vars.first_start)?, read(&vars.second_start)?));
        }

        let machines = if self.encoding.has_machine_identity() {
            let mut machines = Vec::with_capacity(self.jobs.len());
            for vars in &self.jobs {
                let (Some(first), Some(second)) = (&vars.first_machine, &vars.second_machine) else {
                    return Err(ScheduleError::SolverFailure(format!(
                        "{} model carries no machine variables",
                        self.encoding.name()
                    )));
                };
                machines.push((machine(first)?, machine(second)?));
            }
            machines
        } else {
            colour(&starts, self.params.p1, self.params.p2)
        };

        let used = machines.iter().map(|&(a, b)| a.max(b)).max().unwrap_or(0);
        if used > claimed {
            return Err(ScheduleError::SolverFailure(format!(
                "schedule uses machine {used} but the answer claims {claimed}"
            )));
        }

        let assignments = starts
            .into_iter()
            .zip(machines)
            .map(|((t, s), (m1, m2))| Assignment::new(t, m1, s, m2))
            .collect();
        Ok(Solution::new(assignments, claimed))
    }
}

/// Assigns 1-based machines to every operation, lowest free machine first,
/// in order of start time.
fn colour(starts: &[(i64, i64)], p1: i64, p2: i64) -> Vec<(usize, usize)> {
    let mut operations: Vec<(i64, i64, usize, usize)> = starts
        .iter()
        .enumerate()
        .flat_map(|(j, &(t, s))| [(t, t + p1, j, 0), (s, s + p2, j, 1)])
        .collect();
    operations.sort_unstable();

    let mut free_from: Vec<i64> = Vec::new();
    let mut machines = vec![(0, 0); starts.len()];
    for (start, end, job, op) in operations {
        let m = match free_from.iter().position(|&f| f <= start) {
            Some(m) => m,
            None => {
                free_from.push(i64::MIN);
                free_from.len() - 1
            }
        };
        free_from[m] = end;
        if op == 0 {
            machines[job].0 = m + 1;
        } else {
            machines[job].1 = m + 1;
        }
    }
    machines
}
