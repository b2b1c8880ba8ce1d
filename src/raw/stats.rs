// Running statistics over the probe-sequence lengths of occupied slots.
//
// Maintained incrementally by insert and delete rather than recomputed: the
// average tells a lookup where to start probing and the maximum tells it
// where to stop, which is what keeps lookups and deletes sub-linear on long
// probe chains.
pub struct PslStats {
    // Sum of the PSL of every occupied slot.
    total: u64,
    // Number of occupied slots.
    entries: usize,
    // Largest PSL currently present, 0 when the table is empty.
    max: usize,
    // Occupancy histogram indexed by PSL. When the last entry at the current
    // maximum disappears, the new maximum has to be found without scanning
    // the slot array; stepping down through the histogram does that in O(1)
    // amortized.
    counts: Vec<usize>,
}

impl PslStats {
    pub fn new() -> PslStats {
        PslStats {
            total: 0,
            entries: 0,
            max: 0,
            counts: Vec::new(),
        }
    }

    // Account for an entry landing at `psl`.
    pub fn record(&mut self, psl: usize) {
        self.total += psl as u64;
        self.entries += 1;
        if psl >= self.counts.len() {
            self.counts.resize(psl + 1, 0);
        }
        self.counts[psl] += 1;
        if psl > self.max {
            self.max = psl;
        }
    }

    // Account for an entry leaving `psl`, whether removed outright,
    // displaced by an insertion, or shifted back during a delete.
    pub fn remove(&mut self, psl: usize) {
        debug_assert!(self.counts[psl] > 0);
        self.total -= psl as u64;
        self.entries -= 1;
        self.counts[psl] -= 1;
        while self.max > 0 && self.counts[self.max] == 0 {
            self.max -= 1;
        }
    }

    pub fn max_psl(&self) -> usize {
        self.max
    }

    // Number of occupied slots sitting at the maximum PSL.
    pub fn max_freq(&self) -> usize {
        self.counts.get(self.max).copied().unwrap_or(0)
    }

    // Mean PSL over occupied slots, rounded down. 0 for an empty table.
    pub fn average(&self) -> usize {
        if self.entries == 0 {
            0
        } else {
            (self.total / self.entries as u64) as usize
        }
    }

    #[cfg(test)]
    pub fn total(&self) -> u64 {
        self.total
    }

    // Forget everything; the slot array is about to be replayed.
    pub fn clear(&mut self) {
        self.total = 0;
        self.entries = 0;
        self.max = 0;
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let stats = PslStats::new();
        assert_eq!(stats.average(), 0);
        assert_eq!(stats.max_psl(), 0);
        assert_eq!(stats.max_freq(), 0);
    }

    #[test]
    fn record_tracks_max_and_average() {
        let mut stats = PslStats::new();
        stats.record(0);
        stats.record(1);
        stats.record(5);
        assert_eq!(stats.max_psl(), 5);
        assert_eq!(stats.max_freq(), 1);
        assert_eq!(stats.average(), 2);

        stats.record(5);
        assert_eq!(stats.max_freq(), 2);
    }

    #[test]
    fn max_steps_down_past_gaps() {
        let mut stats = PslStats::new();
        stats.record(0);
        stats.record(2);
        stats.record(7);

        // 7 goes away; the next occupied level is 2, not 6.
        stats.remove(7);
        assert_eq!(stats.max_psl(), 2);
        assert_eq!(stats.max_freq(), 1);

        stats.remove(2);
        assert_eq!(stats.max_psl(), 0);
        assert_eq!(stats.max_freq(), 1);

        stats.remove(0);
        assert_eq!(stats.max_psl(), 0);
        assert_eq!(stats.max_freq(), 0);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn shift_is_remove_then_record() {
        let mut stats = PslStats::new();
        stats.record(2);
        stats.record(2);
        stats.remove(2);
        stats.record(1);
        assert_eq!(stats.max_psl(), 2);
        assert_eq!(stats.max_freq(), 1);
        assert_eq!(stats.total(), 3);
    }
}
