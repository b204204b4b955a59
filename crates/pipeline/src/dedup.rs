//! Suppresses repeat deliveries of the same round.
//!
//! Rounds carrying an id are matched by id. Id-less rounds fall back to a
//! content+time check against recently recorded multipliers.

use std::collections::{HashSet, VecDeque};

use crash_signal_core::RoundEvent;

/// Id window size that triggers compaction.
pub const ID_WINDOW_LIMIT: usize = 100;
/// Ids kept after compaction (the most recently inserted).
pub const ID_WINDOW_RETAIN: usize = 50;
/// How long a recorded multiplier suppresses id-less lookalikes.
pub const CONTENT_WINDOW_MS: i64 = 2000;
/// Multipliers closer than this are treated as the same round.
pub const CONTENT_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    ids: HashSet<String>,
    id_order: VecDeque<String>,
    recent: VecDeque<(f64, i64)>,
}

impl Deduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `round` was already recorded.
    ///
    /// `now_ms` is the insertion clock, not the round's own timestamp.
    #[must_use]
    pub fn is_duplicate(&self, round: &RoundEvent, now_ms: i64) -> bool {
        match &round.round_id {
            Some(id) => self.ids.contains(id),
            None => self.recent.iter().any(|&(multiplier, recorded_at)| {
                now_ms - recorded_at < CONTENT_WINDOW_MS
                    && (multiplier - round.multiplier).abs() < CONTENT_EPSILON
            }),
        }
    }

    /// Records an accepted round.
    ///
    /// Every round enters the content window. Ids are kept until the id window
    /// passes 100 entries, at which point only the 50 newest survive.
    pub fn record(&mut self, round: &RoundEvent, now_ms: i64) {
        self.recent
            .retain(|&(_, recorded_at)| now_ms - recorded_at < CONTENT_WINDOW_MS);
        self.recent.push_back((round.multiplier, now_ms));

        let Some(id) = &round.round_id else {
            return;
        };
        if !self.ids.insert(id.clone()) {
            return;
        }
        self.id_order.push_back(id.clone());

        if self.id_order.len() > ID_WINDOW_LIMIT {
            let excess = self.id_order.len() - ID_WINDOW_RETAIN;
            for old in self.id_order.drain(..excess) {
                self.ids.remove(&old);
            }
        }
    }

    /// Number of ids currently remembered.
    #[must_use]
    pub fn id_count(&self) -> usize {
        self.id_order.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.id_order.clear();
        self.recent.clear();
    }
}
