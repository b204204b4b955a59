use std::collections::VecDeque;

use crash_signal_core::{CollaboratorError, PersistenceStore, RoundEvent};
use parking_lot::Mutex;

/// Rounds retained when no explicit retention is given.
pub const DEFAULT_RETENTION: usize = 10_000;

/// Bounded in-memory round log. Oldest rounds are evicted first.
#[derive(Debug)]
pub struct MemoryRoundStore {
    rounds: Mutex<VecDeque<RoundEvent>>,
    retention: usize,
}

impl Default for MemoryRoundStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl MemoryRoundStore {
    #[must_use]
    pub fn new(retention: usize) -> Self {
        Self {
            rounds: Mutex::new(VecDeque::new()),
            retention: retention.max(1),
        }
    }

    #[must_use]
    pub const fn retention(&self) -> usize {
        self.retention
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.lock().is_empty()
    }
}

impl PersistenceStore for MemoryRoundStore {
    fn append(&self, round: &RoundEvent) -> Result<(), CollaboratorError> {
        let mut rounds = self.rounds.lock();
        if rounds.len() >= self.retention {
            rounds.pop_front();
        }
        rounds.push_back(round.clone());
        Ok(())
    }

    fn load_recent(&self, n: usize) -> Result<Vec<RoundEvent>, CollaboratorError> {
        let rounds = self.rounds.lock();
        let skip = rounds.len().saturating_sub(n);
        Ok(rounds.iter().skip(skip).cloned().collect())
    }

    fn clear(&self) -> Result<(), CollaboratorError> {
        self.rounds.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(m: f64, ts: i64) -> RoundEvent {
        RoundEvent::new(m, ts).unwrap()
    }

    #[test]
    fn load_recent_returns_newest_in_order() {
        let store = MemoryRoundStore::default();
        for i in 0..5 {
            store.append(&round(1.0 + i as f64, i)).unwrap();
        }

        let recent = store.load_recent(3).unwrap();
        let ts: Vec<i64> = recent.iter().map(|r| r.timestamp).collect();
        assert_eq!(ts, vec![2, 3, 4]);
    }

    #[test]
    fn load_recent_larger_than_store_returns_all() {
        let store = MemoryRoundStore::default();
        store.append(&round(2.0, 1)).unwrap();
        assert_eq!(store.load_recent(100).unwrap().len(), 1);
    }

    #[test]
    fn retention_evicts_oldest() {
        let store = MemoryRoundStore::new(3);
        for i in 0..5 {
            store.append(&round(1.5, i)).unwrap();
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.load_recent(3).unwrap()[0].timestamp, 2);
    }

    #[test]
    fn clear_empties_store() {
        let store = MemoryRoundStore::default();
        store.append(&round(1.5, 0)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
