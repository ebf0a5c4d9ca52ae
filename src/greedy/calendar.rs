//! Per-machine booking lists.

/// Bookings of every opened machine as half-open `[start, end)` ranges.
///
/// Machines are numbered from 0 internally; schedules report them 1-based.
#[derive(Debug, Clone, Default)]
pub struct MachineCalendar {
    machines: Vec<Vec<(i64, i64)>>,
}

impl MachineCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of opened machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Opens a new machine and returns its index.
    pub fn open(&mut self) -> usize {
        self.machines.push(Vec::new());
        self.machines.len() - 1
    }

    /// Whether `machine` is idle throughout `[start, end)`.
    pub fn is_free(&self, machine: usize, start: i64, end: i64) -> bool {
        self.is_free_with(machine, start, end, None)
    }

    /// Like [`is_free`](Self::is_free), with `extra` counted as booked.
    pub fn is_free_with(&self, machine: usize, start: i64, end: i64, extra: Option<(i64, i64)>) -> bool {
        let bookings = &self.machines[machine];
        let next = bookings.partition_point(|&(_, e)| e <= start);
        let clash = |&(s, e): &(i64, i64)| s < end && start < e;
        !bookings.get(next).is_some_and(clash) && !extra.as_ref().is_some_and(clash)
    }

    /// Starts in `[lo, hi]` for an operation of `duration` on `machine` that
    /// sit on a window edge or touch a booking (`extra` included), ascending
    /// and deduplicated. Occupied starts are not filtered out.
    pub fn touching_starts(
        &self,
        machine: usize,
        lo: i64,
        hi: i64,
        duration: i64,
        extra: Option<(i64, i64)>,
    ) -> Vec<i64> {
        let bookings = &self.machines[machine];
        // Bookings are disjoint, so ends ascend with starts.
        let from = bookings.partition_point(|&(_, e)| e < lo);
        let to = bookings.partition_point(|&(s, _)| s <= hi.saturating_add(duration));
        let mut starts = vec![lo, hi];
        for &(s, e) in bookings[from..to.max(from)].iter().chain(&extra) {
            starts.push(e);
            if let Some(before) = s.checked_sub(duration) {
                starts.push(before);
            }
        }
        starts.retain(|t| (lo..=hi).contains(t));
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Idle time between `[start, end)` and its nearest bookings on
    /// `machine` (`extra` included), as `(before, after)`. A side with no
    /// booking is `None`.
    pub fn neighbour_gaps(
        &self,
        machine: usize,
        start: i64,
        end: i64,
        extra: Option<(i64, i64)>,
    ) -> (Option<i64>, Option<i64>) {
        let bookings = &self.machines[machine];
        let prev = bookings.partition_point(|&(_, e)| e <= start);
        let next = bookings.partition_point(|&(s, _)| s < end);
        let previous_end = prev.checked_sub(1).map(|i| bookings[i].1);
        let next_start = bookings.get(next).map(|&(s, _)| s);

        let (previous_end, next_start) = match extra {
            Some((_, e)) if e <= start => (previous_end.max(Some(e)), next_start),
            Some((s, _)) if s >= end => (previous_end, Some(next_start.map_or(s, |n| n.min(s)))),
            _ => (previous_end, next_start),
        };
        (
            previous_end.map(|e| start.saturating_sub(e)),
            next_start.map(|s| s.saturating_sub(end)),
        )
    }

    /// Lowest opened machine idle throughout `[start, end)` that also
    /// passes `accept`.
    pub fn lowest_free_where(
        &self,
        start: i64,
        end: i64,
        accept: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        (0..self.machines.len()).find(|&m| accept(m) && self.is_free(m, start, end))
    }

    /// Lowest opened machine idle throughout `[start, end)`.
    pub fn lowest_free(&self, start: i64, end: i64) -> Option<usize> {
        self.lowest_free_where(start, end, |_| true)
    }

    /// Books `[start, end)` on `machine`.
    pub fn book(&mut self, machine: usize, start: i64, end: i64) {
        let bookings = &mut self.machines[machine];
        let at = bookings.partition_point(|&(s, _)| s < start);
        bookings.insert(at, (start, end));
    }

    /// Booking ends inside `(after, up_to]`, ascending and deduplicated.
    pub fn ends_within(&self, after: i64, up_to: i64) -> Vec<i64> {
        let mut ends: Vec<i64> = self
            .machines
            .iter()
            .flatten()
            .map(|&(_, e)| e)
            .filter(|&e| e > after && e <= up_to)
            .collect();
        ends.sort_unstable();
        ends.dedup();
        ends
    }
}
