//! Rolling window statistics over the round history.
//!
//! Every query rescans the window it is given. Windows are small (at most the
//! buffer capacity) so there is no incremental state to keep in sync.

use crash_signal_core::RoundEvent;
use serde::{Deserialize, Serialize};

/// Thresholds reported in `WindowStats::frequencies`.
pub const FREQUENCY_THRESHOLDS: [f64; 4] = [1.5, 2.0, 3.0, 5.0];

/// Nominal window lengths of the standard window set.
pub const WINDOW_LAST_10: usize = 10;
pub const WINDOW_LAST_20: usize = 20;
pub const WINDOW_LAST_50: usize = 50;

/// How often rounds met or exceeded a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFrequency {
    pub threshold: f64,
    pub count: usize,
    /// Unrounded percentage of rounds at or above the threshold.
    pub rate: f64,
}

impl ThresholdFrequency {
    /// Rate rounded to one decimal place for display.
    #[must_use]
    pub fn rate_display(&self) -> f64 {
        (self.rate * 10.0).round() / 10.0
    }
}

/// Summary statistics for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub count: usize,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Population standard deviation.
    pub volatility: f64,
    /// OLS slope of multiplier against 0-based index.
    pub trend: f64,
    pub frequencies: Vec<ThresholdFrequency>,
}

impl WindowStats {
    /// Frequency entry for an exact threshold from `FREQUENCY_THRESHOLDS`.
    #[must_use]
    pub fn frequency(&self, threshold: f64) -> Option<&ThresholdFrequency> {
        self.frequencies
            .iter()
            .find(|f| (f.threshold - threshold).abs() < f64::EPSILON)
    }

    /// Unrounded rate for a threshold, or 0 when the threshold is not tracked.
    #[must_use]
    pub fn rate(&self, threshold: f64) -> f64 {
        self.frequency(threshold).map_or(0.0, |f| f.rate)
    }
}

/// Computes `WindowStats` over a slice of rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAnalyzer;

impl WindowAnalyzer {
    /// Returns `None` for an empty window.
    #[must_use]
    pub fn analyze(rounds: &[RoundEvent]) -> Option<WindowStats> {
        if rounds.is_empty() {
            return None;
        }

        let values: Vec<f64> = rounds.iter().map(|r| r.multiplier).collect();
        let n = values.len() as f64;

        let sum: f64 = values.iter().sum();
        let average = sum / n;
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);

        let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / n;

        let frequencies = FREQUENCY_THRESHOLDS
            .iter()
            .map(|&threshold| {
                let count = values.iter().filter(|&&v| v >= threshold).count();
                ThresholdFrequency {
                    threshold,
                    count,
                    rate: 100.0 * count as f64 / n,
                }
            })
            .collect();

        Some(WindowStats {
            count: values.len(),
            average,
            max,
            min,
            volatility: variance.sqrt(),
            trend: ols_slope(&values),
            frequencies,
        })
    }
}

/// Closed-form least-squares slope of `values` against their index.
///
/// Returns 0 for fewer than two points.
#[must_use]
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (nf * sum_xy - sum_x * sum_y) / denominator
}

/// Returns the last `min(n, len)` rounds.
#[must_use]
pub fn suffix(rounds: &[RoundEvent], n: usize) -> &[RoundEvent] {
    &rounds[rounds.len().saturating_sub(n)..]
}

/// The four standard windows over the retained history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSet {
    pub last10: Option<WindowStats>,
    pub last20: Option<WindowStats>,
    pub last50: Option<WindowStats>,
    pub all: Option<WindowStats>,
}

impl WindowSet {
    /// Computes every window from the corresponding suffix of `history`.
    #[must_use]
    pub fn compute(history: &[RoundEvent]) -> Self {
        Self {
            last10: WindowAnalyzer::analyze(suffix(history, WINDOW_LAST_10)),
            last20: WindowAnalyzer::analyze(suffix(history, WINDOW_LAST_20)),
            last50: WindowAnalyzer::analyze(suffix(history, WINDOW_LAST_50)),
            all: WindowAnalyzer::analyze(history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds(values: &[f64]) -> Vec<RoundEvent> {
        values
            .iter()
            .enumerate()
            .map(|(i, &m)| RoundEvent::new(m, i as i64).unwrap())
            .collect()
    }

    // ============================================
    // WindowAnalyzer
    // ============================================

    #[test]
    fn empty_window_has_no_stats() {
        assert!(WindowAnalyzer::analyze(&[]).is_none());
    }

    #[test]
    fn volatility_is_population_std_dev() {
        let stats = WindowAnalyzer::analyze(&rounds(&[1.0, 2.0, 3.0])).unwrap();
        assert!((stats.average - 2.0).abs() < 1e-12);
        assert!((stats.volatility - 0.8165).abs() < 1e-4);
    }

    #[test]
    fn min_max_and_count() {
        let stats = WindowAnalyzer::analyze(&rounds(&[1.3, 7.2, 2.0, 1.0])).unwrap();
        assert_eq!(stats.count, 4);
        assert!((stats.max - 7.2).abs() < f64::EPSILON);
        assert!((stats.min - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trend_is_zero_for_single_round() {
        let stats = WindowAnalyzer::analyze(&rounds(&[4.0])).unwrap();
        assert_eq!(stats.trend, 0.0);
        assert_eq!(stats.volatility, 0.0);
    }

    #[test]
    fn trend_matches_linear_sequence() {
        let stats = WindowAnalyzer::analyze(&rounds(&[1.0, 1.5, 2.0, 2.5])).unwrap();
        assert!((stats.trend - 0.5).abs() < 1e-12);
    }

    #[test]
    fn trend_is_negative_for_falling_sequence() {
        assert!(ols_slope(&[3.0, 2.0, 1.0]) < 0.0);
    }

    #[test]
    fn frequencies_include_threshold_values() {
        let stats = WindowAnalyzer::analyze(&rounds(&[1.5, 2.0, 1.2, 5.0])).unwrap();

        let f15 = stats.frequency(1.5).unwrap();
        assert_eq!(f15.count, 3);
        assert!((f15.rate - 75.0).abs() < 1e-12);

        assert_eq!(stats.frequency(2.0).unwrap().count, 2);
        assert_eq!(stats.frequency(5.0).unwrap().count, 1);
        assert_eq!(stats.frequencies.len(), 4);
    }

    #[test]
    fn rate_display_rounds_to_one_decimal() {
        let stats = WindowAnalyzer::analyze(&rounds(&[2.0, 1.0, 1.0])).unwrap();
        let f2 = stats.frequency(2.0).unwrap();
        assert!((f2.rate - 100.0 / 3.0).abs() < 1e-12);
        assert!((f2.rate_display() - 33.3).abs() < 1e-12);
    }

    // ============================================
    // WindowSet
    // ============================================

    #[test]
    fn window_counts_are_monotonic() {
        for len in [0usize, 5, 10, 15, 20, 35, 50, 80] {
            let history = rounds(&vec![1.7; len]);
            let set = WindowSet::compute(&history);
            let count = |w: &Option<WindowStats>| w.as_ref().map_or(0, |s| s.count);
            assert!(count(&set.last10) <= count(&set.last20));
            assert!(count(&set.last20) <= count(&set.last50));
            assert!(count(&set.last50) <= count(&set.all));
            assert_eq!(count(&set.all), len);
        }
    }

    #[test]
    fn windows_use_most_recent_rounds() {
        let mut values = vec![1.0; 40];
        values.extend(vec![3.0; 10]);
        let set = WindowSet::compute(&rounds(&values));

        assert!((set.last10.unwrap().average - 3.0).abs() < 1e-12);
        assert!((set.last20.unwrap().average - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_history_serializes_null_windows() {
        let json = serde_json::to_value(WindowSet::compute(&[])).unwrap();
        assert!(json["last10"].is_null());
        assert!(json["all"].is_null());
    }

    #[test]
    fn suffix_clamps_to_length() {
        let history = rounds(&[1.1, 1.2]);
        assert_eq!(suffix(&history, 10).len(), 2);
        assert_eq!(suffix(&history, 1)[0].multiplier, 1.2);
    }
}
