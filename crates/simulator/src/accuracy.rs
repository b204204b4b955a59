//! Scores issued recommendations against the round that followed them.

use crash_signal_core::{Action, Recommendation, MIN_RECOMMENDATION_HISTORY};
use serde::{Deserialize, Serialize};

/// A WAIT is judged correct when the next round crashes below this.
pub const WAIT_CORRECT_BELOW: f64 = 1.5;

/// Running prediction accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionAccuracy {
    pub total: u32,
    pub correct: u32,
}

impl PredictionAccuracy {
    /// Percentage of scored predictions that were correct.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total) * 100.0
    }
}

/// Holds the last issued recommendation until the next round scores it.
#[derive(Debug, Clone, Default)]
pub struct PredictionTracker {
    pending: Option<Recommendation>,
    accuracy: PredictionAccuracy,
}

impl PredictionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the recommendation issued for a history of `history_len` rounds.
    ///
    /// Recommendations issued before the history is long enough to judge are
    /// not scored.
    pub fn issue(&mut self, recommendation: &Recommendation, history_len: usize) {
        self.pending =
            (history_len >= MIN_RECOMMENDATION_HISTORY).then(|| recommendation.clone());
    }

    /// Scores the pending recommendation against the next crash point.
    ///
    /// Returns whether it was correct, or `None` if nothing was pending.
    pub fn observe(&mut self, multiplier: f64) -> Option<bool> {
        let recommendation = self.pending.take()?;
        let correct = is_correct(&recommendation, multiplier);

        self.accuracy.total += 1;
        if correct {
            self.accuracy.correct += 1;
        }
        Some(correct)
    }

    #[must_use]
    pub const fn accuracy(&self) -> PredictionAccuracy {
        self.accuracy
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn is_correct(recommendation: &Recommendation, multiplier: f64) -> bool {
    match recommendation.action {
        Action::Wait => multiplier < WAIT_CORRECT_BELOW,
        Action::Bet => recommendation.target.is_some_and(|t| multiplier >= t),
    }
}
