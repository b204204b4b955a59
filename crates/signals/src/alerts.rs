//! Alert rules turning recommendations and patterns into notifications.

use crash_signal_core::{
    AlertKind, Confidence, Notification, NotificationPayload, Pattern, Recommendation,
    RoundEvent, MIN_PATTERN_HISTORY,
};

const PRIORITY_URGENT: u8 = 2;
const PRIORITY_NORMAL: u8 = 1;

const MEDIUM_ALERT_TARGET: f64 = 2.0;

/// Stateless alert rule set evaluated after every accepted round.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertRules;

impl AlertRules {
    /// Returns the alerts triggered by the current signal state.
    ///
    /// Nothing fires until the history holds at least 10 rounds.
    #[must_use]
    pub fn evaluate(
        history: &[RoundEvent],
        recommendation: &Recommendation,
        patterns: &[Pattern],
        timestamp: i64,
    ) -> Vec<Notification> {
        let mut alerts = Vec::new();
        if history.len() < MIN_PATTERN_HISTORY {
            return alerts;
        }

        let target = recommendation
            .target
            .map_or_else(|| "-".to_string(), |t| format!("{t:.1}x"));

        if recommendation.confidence == Confidence::High {
            alerts.push(Notification {
                kind: AlertKind::HighConfidence,
                title: "High Confidence Bet".to_string(),
                message: format!("Target: {target} - {}", recommendation.reasons.join(", ")),
                priority: PRIORITY_URGENT,
                payload: NotificationPayload::Recommendation(recommendation.clone()),
                timestamp,
            });
        }

        let medium_at_2x = recommendation
            .target
            .is_some_and(|t| (t - MEDIUM_ALERT_TARGET).abs() < f64::EPSILON);
        if recommendation.confidence == Confidence::Medium && medium_at_2x {
            let first_reason = recommendation.reasons.first().map_or("", String::as_str);
            alerts.push(Notification {
                kind: AlertKind::MediumConfidence,
                title: "Good Opportunity".to_string(),
                message: format!("Target: {target} - {first_reason}"),
                priority: PRIORITY_NORMAL,
                payload: NotificationPayload::Recommendation(recommendation.clone()),
                timestamp,
            });
        }

        if recommendation.is_bet() {
            if let Some(pattern) = patterns.iter().find(|p| p.is_high()) {
                alerts.push(Notification {
                    kind: AlertKind::PatternDetected,
                    title: "Pattern Alert".to_string(),
                    message: pattern.description.clone(),
                    priority: PRIORITY_NORMAL,
                    payload: NotificationPayload::Pattern(pattern.clone()),
                    timestamp,
                });
            }
        }

        alerts
    }
}
