//! Interval encoding.
//!
//! Each operation is a fixed-size interval on the time axis paired with a
//! unit interval on the machine axis. One 2-D no-overlap keeps the
//! (time, machine) rectangles disjoint and `M` is the largest machine
//! index in use.

use super::builder::{start_name, JobVars, OBJECTIVE};
use crate::cp::{CpModel, IntVar, IntervalVar};
use crate::instance::{Operation, ValidatedInstance};

fn machine_name(job: usize, op: Operation) -> String {
    format!("m{}_{job}", op.index() + 1)
}

pub(super) fn encode(model: &mut CpModel, instance: &ValidatedInstance, machines: usize) -> Vec<JobVars> {
    let mut x_intervals = Vec::with_capacity(instance.jobs.len() * 2);
    let mut y_intervals = Vec::with_capacity(instance.jobs.len() * 2);
    let mut machine_vars = Vec::with_capacity(instance.jobs.len() * 2);
    let mut jobs = Vec::with_capacity(instance.jobs.len());

    for (j, windowed) in instance.jobs.iter().enumerate() {
        let window = &windowed.window;
        for op in Operation::ALL {
            let start = start_name(j, op);
            model.add_int_var(IntVar::new(
                start.clone(),
                window.first_possible(op),
                window.last_possible(op),
            ));
            let time = format!("dose{}_{j}", op.index() + 1);
            model.add_interval(IntervalVar::new(time.clone(), start, op.duration(&instance.params)));

            let machine = machine_name(j, op);
            model.add_int_var(IntVar::new(machine.clone(), 1, machines as i64));
            let lane = format!("{time}_machine");
            model.add_interval(IntervalVar::new(lane.clone(), machine.clone(), 1));

            x_intervals.push(time);
            y_intervals.push(lane);
            machine_vars.push(machine);
        }

        let vars = JobVars {
            first_start: start_name(j, Operation::First),
            second_start: start_name(j, Operation::Second),
            first_machine: Some(machine_name(j, Operation::First)),
            second_machine: Some(machine_name(j, Operation::Second)),
        };
        model.add_linear(
            vec![(vars.second_start.clone(), 1), (vars.first_start.clone(), -1)],
            window.anchor_min,
            window.anchor_max,
        );
        jobs.push(vars);
    }

    model.add_no_overlap_2d(x_intervals, y_intervals);
    model.add_max_equality(OBJECTIVE.to_string(), machine_vars);
    jobs
}
