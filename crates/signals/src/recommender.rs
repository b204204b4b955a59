//! Rule-based recommender.
//!
//! Scores the last-20 window and the detected patterns additively, then maps
//! the total onto a bet/wait decision.

use crash_signal_core::{
    Action, Confidence, Pattern, PatternKind, Recommendation, RoundEvent, SignalProvider,
    MIN_RECOMMENDATION_HISTORY,
};

use crate::analyzer::{suffix, WindowAnalyzer, WINDOW_LAST_20};
use crate::patterns::PatternDetector;

const PROBABILITY_2X_CAP: f64 = 0.9;
const PROBABILITY_1_5X_CAP: f64 = 0.95;

const TREND_MIN: f64 = 0.05;

/// Score thresholds for each decision band.
const SCORE_HIGH: i32 = 6;
const SCORE_MEDIUM: i32 = 4;
const SCORE_LOW: i32 = 2;

const TARGET_HIGH: f64 = 2.0;
const TARGET_DEFAULT: f64 = 1.5;

/// The default `SignalProvider`: fixed additive rules over recent statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleRecommender;

impl RuleRecommender {
    pub const NAME: &'static str = "rules";

    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scores a history whose patterns have already been detected.
    #[must_use]
    pub fn recommend_with_patterns(
        &self,
        history: &[RoundEvent],
        patterns: &[Pattern],
    ) -> Recommendation {
        if history.len() < MIN_RECOMMENDATION_HISTORY {
            return Recommendation::neutral();
        }
        let Some(stats) = WindowAnalyzer::analyze(suffix(history, WINDOW_LAST_20)) else {
            return Recommendation::neutral();
        };

        let rate_2x = stats.rate(2.0);
        let rate_1_5x = stats.rate(1.5);

        let mut score = 0;
        let mut reasons = Vec::new();

        if rate_2x >= 50.0 {
            score += 3;
            reasons.push(format!("High 2x+ rate ({rate_2x:.1}%)"));
        } else if rate_2x >= 40.0 {
            score += 2;
            reasons.push(format!("Good 2x+ rate ({rate_2x:.1}%)"));
        }

        if rate_1_5x >= 60.0 {
            score += 2;
            reasons.push(format!("High 1.5x+ rate ({rate_1_5x:.1}%)"));
        }

        if stats.trend > TREND_MIN {
            score += 2;
            reasons.push("Upward trend detected".to_string());
        }

        if let Some(high) = patterns.iter().find(|p| p.is_high()) {
            score += 3;
            reasons.push(high.description.clone());
        }

        if patterns.iter().any(|p| p.kind == PatternKind::ColdStreak) {
            score += 1;
            reasons.push("Cold streak - mean reversion possible".to_string());
        }

        let (action, target, confidence) = if score >= SCORE_HIGH {
            (Action::Bet, Some(TARGET_HIGH), Confidence::High)
        } else if score >= SCORE_MEDIUM {
            (Action::Bet, Some(TARGET_DEFAULT), Confidence::Medium)
        } else if score >= SCORE_LOW {
            (Action::Bet, Some(TARGET_DEFAULT), Confidence::Low)
        } else {
            (Action::Wait, None, Confidence::None)
        };

        tracing::debug!(score, ?action, ?confidence, "rule recommendation");

        Recommendation {
            action,
            target,
            confidence,
            score,
            reasons,
            probability_above_2x: (rate_2x / 100.0).min(PROBABILITY_2X_CAP),
            probability_above_1_5x: (rate_1_5x / 100.0).min(PROBABILITY_1_5X_CAP),
        }
    }
}

impl SignalProvider for RuleRecommender {
    fn recommend(&self, history: &[RoundEvent]) -> Recommendation {
        if history.len() < MIN_RECOMMENDATION_HISTORY {
            return Recommendation::neutral();
        }
        let patterns = PatternDetector::detect(history);
        self.recommend_with_patterns(history, &patterns)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
