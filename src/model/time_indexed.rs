//! Time-indexed encoding.
//!
//! Every candidate start slot of every operation gets a binary. The start
//! times `T` and `S` are reconstructed as `Σ t·y` and `Σ t·z`, and for
//! every timeslot the number of operations in process is bounded by `M`.

use super::builder::{start_name, JobVars, OBJECTIVE};
use crate::cp::{BoolVar, CpModel, IntVar};
use crate::instance::{Operation, ValidatedInstance};
use std::collections::BTreeMap;

fn slot_name(job: usize, op: Operation, t: i64) -> String {
    match op {
        Operation::First => format!("y_{job}_{t}"),
        Operation::Second => format!("z_{job}_{t}"),
    }
}

fn machine_slot_name(job: usize, op: Operation, t: i64, machine: usize) -> String {
    format!("a_{job}_{}_{t}_{machine}", op.index() + 1)
}

fn machine_index_name(job: usize, op: Operation) -> String {
    format!("I_{job}_{}", op.index() + 1)
}

/// Adds the time-indexed variables and constraints to `model`.
///
/// With `with_machines`, each slot binary is split over machines
/// `1..=machines` and every operation gets a machine-index variable.
pub(super) fn encode(
    model: &mut CpModel,
    instance: &ValidatedInstance,
    machines: usize,
    with_machines: bool,
) -> Vec<JobVars> {
    let bound = machines as i64;
    // Binaries in process during each timeslot.
    let mut busy: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    // Same, per (machine, timeslot).
    let mut busy_on: BTreeMap<(usize, i64), Vec<String>> = BTreeMap::new();
    let mut jobs = Vec::with_capacity(instance.jobs.len());

    for (j, windowed) in instance.jobs.iter().enumerate() {
        let window = &windowed.window;
        let mut vars = JobVars {
            first_start: start_name(j, Operation::First),
            second_start: start_name(j, Operation::Second),
            first_machine: None,
            second_machine: None,
        };

        for op in Operation::ALL {
            let duration = op.duration(&instance.params);
            let first = window.first_possible(op);
            let last = window.last_possible(op);
            let start = start_name(j, op);
            model.add_int_var(IntVar::new(start.clone(), first, last));

            let mut choose_one = Vec::new();
            let mut reconstruct = vec![(start, 1)];
            for t in first..=last {
                let y = slot_name(j, op, t);
                model.add_bool_var(BoolVar::new(y.clone()));
                choose_one.push((y.clone(), 1));
                reconstruct.push((y.clone(), -t));
                for covered in t..t + duration {
                    busy.entry(covered).or_default().push(y.clone());
                }

                if with_machines {
                    let mut link = vec![(y.clone(), 1)];
                    for m in 1..=machines {
                        let a = machine_slot_name(j, op, t, m);
                        model.add_bool_var(BoolVar::new(a.clone()));
                        link.push((a.clone(), -1));
                        for covered in t..t + duration {
                            busy_on.entry((m, covered)).or_default().push(a.clone());
                        }
                    }
                    model.add_linear_eq(link, 0);
                }
            }
            model.add_linear_eq(choose_one, 1);
            model.add_linear_eq(reconstruct, 0);

            if with_machines {
                let index = machine_index_name(j, op);
                model.add_int_var(IntVar::new(index.clone(), 1, bound));
                let mut terms = vec![(index.clone(), 1)];
                for t in first..=last {
                    for m in 1..=machines {
                        terms.push((machine_slot_name(j, op, t, m), -(m as i64)));
                    }
                }
                model.add_linear_eq(terms, 0);
                // A machine index beyond M would use a machine not yet opened.
                model.add_linear(
                    vec![(index.clone(), 1), (OBJECTIVE.to_string(), -1)],
                    -bound,
                    0,
                );
                match op {
                    Operation::First => vars.first_machine = Some(index),
                    Operation::Second => vars.second_machine = Some(index),
                }
            }
        }

        model.add_linear(
            vec![(vars.second_start.clone(), 1), (vars.first_start.clone(), -1)],
            window.anchor_min,
            window.anchor_max,
        );
        jobs.push(vars);
    }

    for (_, slots) in busy {
        let lower = -bound;
        let mut terms: Vec<(String, i64)> = slots.into_iter().map(|y| (y, 1)).collect();
        terms.push((OBJECTIVE.to_string(), -1));
        model.add_linear(terms, lower, 0);
    }
    for (_, slots) in busy_on {
        let terms = slots.into_iter().map(|a| (a, 1)).collect();
        model.add_linear(terms, 0, 1);
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::Constraint;
    use crate::instance::{Instance, Job, Params};

    fn model_for(instance: &Instance, machines: usize, with_machines: bool) -> (CpModel, Vec<JobVars>) {
        let validated = instance.validate().unwrap();
        let mut model = CpModel::new("test", 10);
        model.add_int_var(IntVar::new(OBJECTIVE, 1, machines as i64));
        let jobs = encode(&mut model, &validated, machines, with_machines);
        (model, jobs)
    }

    #[test]
    fn test_single_unit_job_shape() {
        let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(1, 1, 0, 1)]);
        let (model, jobs) = model_for(&instance, 1, false);

        // M, T_0, S_0 plus one slot binary per dose.
        assert_eq!(model.int_vars.len(), 3);
        assert_eq!(model.bool_vars.len(), 2);
        assert_eq!(jobs[0].first_start, "T_0");
        assert_eq!(jobs[0].second_start, "S_0");
        assert!(jobs[0].first_machine.is_none());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_capacity_rows_cover_processing() {
        // p1 = 2: the single dose-1 slot at t=1 is busy during 1 and 2.
        let instance = Instance::new(Params::new(2, 1, 0), vec![Job::new(1, 2, 0, 1)]);
        let (model, _) = model_for(&instance, 1, false);

        let rows: Vec<_> = model
            .constraints
            .iter()
            .filter(|c| match c {
                Constraint::Linear { terms, upper, .. } => {
                    *upper == 0 && terms.iter().any(|(n, c)| n == OBJECTIVE && *c == -1)
                }
                _ => false,
            })
            .collect();
        // Timeslots 1, 2 (dose 1) and 3 (dose 2).
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_machine_split() {
        let instance = Instance::new(Params::new(1, 1, 0), vec![Job::new(1, 2, 0, 1)]);
        let (model, jobs) = model_for(&instance, 2, true);

        // Dose 1 slots {1, 2}, dose 2 slots {2, 3}: 4 slot binaries, each
        // split over 2 machines.
        assert_eq!(model.bool_vars.len(), 4 + 8);
        assert_eq!(jobs[0].first_machine.as_deref(), Some("I_0_1"));
        assert_eq!(jobs[0].second_machine.as_deref(), Some("I_0_2"));
        assert!(model.int_var("I_0_2").is_some());
        assert!(model.validate().is_ok());
    }
}
