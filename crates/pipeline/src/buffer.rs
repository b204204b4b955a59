use std::collections::VecDeque;

use crash_signal_core::RoundEvent;

/// Default in-memory history length.
pub const DEFAULT_CAPACITY: usize = 500;

/// Bounded FIFO of accepted rounds in acceptance order.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    rounds: VecDeque<RoundEvent>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Creates an empty buffer. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rounds: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a round, evicting the oldest when full.
    pub fn append(&mut self, round: RoundEvent) {
        if self.rounds.len() >= self.capacity {
            self.rounds.pop_front();
        }
        self.rounds.push_back(round);
    }

    /// The last `min(n, len)` rounds, oldest first.
    #[must_use]
    pub fn suffix(&self, n: usize) -> Vec<RoundEvent> {
        let skip = self.rounds.len().saturating_sub(n);
        self.rounds.iter().skip(skip).cloned().collect()
    }

    #[must_use]
    pub fn all(&self) -> Vec<RoundEvent> {
        self.rounds.iter().cloned().collect()
    }

    /// Borrows the whole history as one slice.
    pub fn as_slice(&mut self) -> &[RoundEvent] {
        self.rounds.make_contiguous()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&RoundEvent> {
        self.rounds.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(ts: i64) -> RoundEvent {
        RoundEvent::new(1.5, ts).unwrap()
    }

    fn timestamps(rounds: &[RoundEvent]) -> Vec<i64> {
        rounds.iter().map(|r| r.timestamp).collect()
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut buffer = HistoryBuffer::new(10);
        for ts in [30, 10, 20] {
            buffer.append(round(ts));
        }
        assert_eq!(timestamps(&buffer.all()), vec![30, 10, 20]);
        assert_eq!(buffer.latest().unwrap().timestamp, 20);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut buffer = HistoryBuffer::new(3);
        for ts in 0..5 {
            buffer.append(round(ts));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(timestamps(&buffer.all()), vec![2, 3, 4]);
    }

    #[test]
    fn suffix_returns_at_most_len() {
        let mut buffer = HistoryBuffer::new(10);
        for ts in 0..4 {
            buffer.append(round(ts));
        }
        assert_eq!(timestamps(&buffer.suffix(2)), vec![2, 3]);
        assert_eq!(buffer.suffix(50).len(), 4);
        assert!(buffer.suffix(0).is_empty());
    }

    #[test]
    fn as_slice_matches_all_after_wraparound() {
        let mut buffer = HistoryBuffer::new(3);
        for ts in 0..7 {
            buffer.append(round(ts));
        }
        let all = buffer.all();
        assert_eq!(buffer.as_slice(), all.as_slice());
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = HistoryBuffer::default();
        buffer.append(round(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
    }
}
