use crash_signal_core::{Notification, Pattern, Recommendation, RoundEvent};
use crash_signal_simulator::{SessionSummary, SettledBet, StopReason};
use serde::Serialize;

/// Broadcast to observers after the actor handles a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PipelineEvent {
    /// A round passed validation and dedup and joined the history.
    RoundAccepted {
        round: RoundEvent,
        recommendation: Recommendation,
        patterns: Vec<Pattern>,
    },

    /// An alert rule fired.
    NotificationRaised(Notification),

    /// The active simulation settled a bet.
    BetSettled(SettledBet),

    /// The active simulation hit its stop-loss or take-profit.
    SimulationStopped(StopReason),

    /// A simulation session was ended and discarded.
    SimulationEnded(Box<SessionSummary>),

    /// History was wiped.
    DataCleared,
}
