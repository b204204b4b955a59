//! Signal types shared by the analyzers, recommenders and alerting.
//!
//! Patterns and recommendations are derived values: they are recomputed from
//! the history on demand and never persisted.

use serde::{Deserialize, Serialize};

/// Rounds required before any recommender issues a non-neutral decision.
pub const MIN_RECOMMENDATION_HISTORY: usize = 20;

/// Rounds required before pattern rules and alerts run.
pub const MIN_PATTERN_HISTORY: usize = 10;

/// Qualitative confidence attached to a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternConfidence {
    Low,
    Medium,
    High,
}

/// The fixed set of pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    #[serde(rename = "HOT_STREAK_2X")]
    HotStreak2x,
    #[serde(rename = "HOT_STREAK_1.5X")]
    HotStreak1_5x,
    #[serde(rename = "HIGH_AVERAGE")]
    HighAverage,
    #[serde(rename = "CONSECUTIVE_HIGHS")]
    ConsecutiveHighs,
    #[serde(rename = "COLD_STREAK")]
    ColdStreak,
}

impl PatternKind {
    /// Wire name of the pattern.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HotStreak2x => "HOT_STREAK_2X",
            Self::HotStreak1_5x => "HOT_STREAK_1.5X",
            Self::HighAverage => "HIGH_AVERAGE",
            Self::ConsecutiveHighs => "CONSECUTIVE_HIGHS",
            Self::ColdStreak => "COLD_STREAK",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named condition over the recent rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// Human-readable summary with the numbers that triggered the rule.
    pub description: String,
    pub confidence: PatternConfidence,
}

impl Pattern {
    #[must_use]
    pub fn new(
        kind: PatternKind,
        description: impl Into<String>,
        confidence: PatternConfidence,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            confidence,
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.confidence == PatternConfidence::High
    }
}

/// Bet or wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Bet,
    Wait,
}

/// Confidence attached to a recommendation. `None` accompanies every WAIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

/// Scored bet/wait decision for the next round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: Action,
    /// Cash-out multiplier; `None` when waiting.
    pub target: Option<f64>,
    pub confidence: Confidence,
    /// Accumulated rule score that produced the decision.
    pub score: i32,
    /// Justifications in the order the rules fired.
    pub reasons: Vec<String>,
    #[serde(rename = "probabilityAbove2x")]
    pub probability_above_2x: f64,
    #[serde(rename = "probabilityAbove1_5x")]
    pub probability_above_1_5x: f64,
}

impl Recommendation {
    /// The insufficient-history result: WAIT with no confidence and no score.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            action: Action::Wait,
            target: None,
            confidence: Confidence::None,
            score: 0,
            reasons: Vec::new(),
            probability_above_2x: 0.0,
            probability_above_1_5x: 0.0,
        }
    }

    #[must_use]
    pub fn is_bet(&self) -> bool {
        self.action == Action::Bet
    }
}

impl Default for Recommendation {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Which alert rule produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HighConfidence,
    MediumConfidence,
    PatternDetected,
}

/// The signal an alert is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum NotificationPayload {
    Recommendation(Recommendation),
    Pattern(Pattern),
}

/// A user-facing alert handed to every registered `NotificationSink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    /// Higher is more urgent.
    pub priority: u8,
    pub payload: NotificationPayload,
    /// Milliseconds since epoch.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_recommendation_is_wait_none() {
        let rec = Recommendation::neutral();
        assert_eq!(rec.action, Action::Wait);
        assert_eq!(rec.confidence, Confidence::None);
        assert_eq!(rec.target, None);
        assert_eq!(rec.score, 0);
        assert!(rec.reasons.is_empty());
        assert!(!rec.is_bet());
    }

    #[test]
    fn recommendation_serializes_probability_field_names() {
        let json = serde_json::to_value(Recommendation::neutral()).unwrap();
        assert!(json.get("probabilityAbove2x").is_some());
        assert!(json.get("probabilityAbove1_5x").is_some());
        assert_eq!(json["action"], "WAIT");
        assert_eq!(json["confidence"], "NONE");
        assert!(json["target"].is_null());
    }

    #[test]
    fn pattern_kind_wire_names() {
        let json = serde_json::to_string(&PatternKind::HotStreak1_5x).unwrap();
        assert_eq!(json, "\"HOT_STREAK_1.5X\"");
        assert_eq!(PatternKind::ColdStreak.to_string(), "COLD_STREAK");
    }

    #[test]
    fn pattern_serializes_type_field() {
        let pattern = Pattern::new(
            PatternKind::ConsecutiveHighs,
            "3 consecutive games above 2.0x",
            PatternConfidence::High,
        );
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["type"], "CONSECUTIVE_HIGHS");
        assert_eq!(json["confidence"], "HIGH");
        assert!(pattern.is_high());
    }

    #[test]
    fn confidence_orders_none_lowest() {
        assert!(Confidence::None < Confidence::Low);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn alert_kind_wire_names() {
        let json = serde_json::to_string(&AlertKind::PatternDetected).unwrap();
        assert_eq!(json, "\"PATTERN_DETECTED\"");
    }
}
