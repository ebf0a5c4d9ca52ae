//! Per-timeslot occupancy counting.

use std::ops::Range;

/// Number of operations in process at each timeslot.
///
/// Grows on demand; owned by a single generator run.
#[derive(Debug, Clone, Default)]
pub struct OccupancyCounter {
    counts: Vec<usize>,
}

impl OccupancyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations in process at `slot`. Negative slots are never occupied.
    pub fn count(&self, slot: i64) -> usize {
        usize::try_from(slot)
            .ok()
            .and_then(|i| self.counts.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Whether every slot of `slots` is below `cap`.
    pub fn fits(&self, mut slots: Range<i64>, cap: usize) -> bool {
        slots.all(|slot| self.count(slot) < cap)
    }

    /// Adds one operation over `slots`. Negative slots are ignored.
    pub fn add(&mut self, slots: Range<i64>) {
        let start = slots.start.max(0) as usize;
        let Ok(end) = usize::try_from(slots.end) else {
            return;
        };
        if end > self.counts.len() {
            self.counts.resize(end, 0);
        }
        for count in &mut self.counts[start.min(end)..end] {
            *count += 1;
        }
    }

    /// First slot past every recorded operation.
    pub fn end(&self) -> i64 {
        self.counts.len() as i64
    }

    /// Highest occupancy over all slots.
    pub fn peak(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_peak() {
        let mut counter = OccupancyCounter::new();
        assert_eq!(counter.peak(), 0);

        counter.add(1..4);
        counter.add(3..5);
        assert_eq!(counter.count(0), 0);
        assert_eq!(counter.count(3), 2);
        assert_eq!(counter.count(4), 1);
        assert_eq!(counter.count(100), 0);
        assert_eq!(counter.peak(), 2);
        assert_eq!(counter.end(), 5);
    }

    #[test]
    fn test_fits() {
        let mut counter = OccupancyCounter::new();
        counter.add(2..4);
        assert!(counter.fits(0..10, 2));
        assert!(!counter.fits(3..5, 1));
        assert!(counter.fits(4..8, 1));
        assert!(counter.fits(-3..0, 1));
    }
}
