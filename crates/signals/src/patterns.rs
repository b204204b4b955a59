//! Fixed pattern rules over the most recent rounds.

use crash_signal_core::{Pattern, PatternConfidence, PatternKind, RoundEvent, MIN_PATTERN_HISTORY};

use crate::analyzer::suffix;

const RECENT_WINDOW: usize = 10;
const SHORT_WINDOW: usize = 5;

const HOT_2X_THRESHOLD: f64 = 2.0;
const HOT_2X_MIN: usize = 5;
const HOT_2X_HIGH: usize = 7;

const HOT_1_5X_THRESHOLD: f64 = 1.5;
const HOT_1_5X_MIN: usize = 7;
const HOT_1_5X_HIGH: usize = 8;

const HIGH_AVERAGE_MIN: f64 = 2.5;

const CONSECUTIVE_THRESHOLD: f64 = 2.0;
const CONSECUTIVE_MIN: usize = 3;

const COLD_THRESHOLD: f64 = 1.5;
const COLD_MIN: usize = 6;

/// Evaluates the pattern rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetector;

impl PatternDetector {
    /// Runs every rule against the last 10 and last 5 rounds.
    ///
    /// Patterns are emitted in rule order. Fewer than 10 rounds yields an
    /// empty list.
    #[must_use]
    pub fn detect(history: &[RoundEvent]) -> Vec<Pattern> {
        let mut patterns = Vec::new();
        if history.len() < MIN_PATTERN_HISTORY {
            return patterns;
        }

        let recent: Vec<f64> = suffix(history, RECENT_WINDOW)
            .iter()
            .map(|r| r.multiplier)
            .collect();
        let short: Vec<f64> = suffix(history, SHORT_WINDOW)
            .iter()
            .map(|r| r.multiplier)
            .collect();
        let total = recent.len();

        let above_2x = count_at_or_above(&recent, HOT_2X_THRESHOLD);
        if above_2x >= HOT_2X_MIN {
            patterns.push(Pattern::new(
                PatternKind::HotStreak2x,
                format!("{above_2x}/{total} games crashed above 2.0x"),
                if above_2x >= HOT_2X_HIGH {
                    PatternConfidence::High
                } else {
                    PatternConfidence::Medium
                },
            ));
        }

        let above_1_5x = count_at_or_above(&recent, HOT_1_5X_THRESHOLD);
        if above_1_5x >= HOT_1_5X_MIN {
            patterns.push(Pattern::new(
                PatternKind::HotStreak1_5x,
                format!("{above_1_5x}/{total} games crashed above 1.5x"),
                if above_1_5x >= HOT_1_5X_HIGH {
                    PatternConfidence::High
                } else {
                    PatternConfidence::Medium
                },
            ));
        }

        let short_avg = short.iter().sum::<f64>() / short.len() as f64;
        if short_avg >= HIGH_AVERAGE_MIN {
            patterns.push(Pattern::new(
                PatternKind::HighAverage,
                format!("Last 5 games averaged {short_avg:.2}x"),
                PatternConfidence::Medium,
            ));
        }

        let run = recent
            .iter()
            .rev()
            .take_while(|&&m| m >= CONSECUTIVE_THRESHOLD)
            .count();
        if run >= CONSECUTIVE_MIN {
            patterns.push(Pattern::new(
                PatternKind::ConsecutiveHighs,
                format!("{run} consecutive games above 2.0x"),
                PatternConfidence::High,
            ));
        }

        let below = recent.iter().filter(|&&m| m < COLD_THRESHOLD).count();
        if below >= COLD_MIN {
            patterns.push(Pattern::new(
                PatternKind::ColdStreak,
                format!("{below}/{total} games below 1.5x - potential reversion"),
                PatternConfidence::Low,
            ));
        }

        patterns
    }
}

fn count_at_or_above(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|&&m| m >= threshold).count()
}
