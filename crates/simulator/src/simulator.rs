//! Policy simulator state machine.
//!
//! `Inactive -> Active -> Stopped`. Activation always starts a fresh session;
//! deactivation returns the final summary and discards the session.

use crash_signal_core::{PolicyError, RoundEvent};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::SessionSummary;
use crate::policy::SimulationPolicy;
use crate::session::{SettledBet, SimulationSession, StopReason};

/// Lifecycle state of the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum SimulatorState {
    #[default]
    Inactive,
    Active,
    /// A stop-loss or take-profit limit was reached.
    Stopped(StopReason),
}

/// What happened when a round was offered to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum SettleOutcome {
    /// A bet was placed and settled.
    Settled(SettledBet),
    /// A limit was reached before this round; no bet was placed.
    Stopped(StopReason),
    /// No active session: inactive, or already stopped.
    Idle,
}

/// Replays rounds against a betting policy.
#[derive(Debug, Default)]
pub struct PolicySimulator {
    state: SimulatorState,
    session: Option<SimulationSession>,
}

impl PolicySimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> SimulatorState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SimulatorState::Active)
    }

    #[must_use]
    pub const fn session(&self) -> Option<&SimulationSession> {
        self.session.as_ref()
    }

    /// Starts a fresh session, replacing any existing one.
    ///
    /// # Errors
    /// Returns `PolicyError` if the policy is invalid; the simulator is left
    /// unchanged.
    pub fn activate(&mut self, policy: SimulationPolicy) -> Result<(), PolicyError> {
        policy.validate()?;

        info!(
            stake = %policy.stake,
            target = %policy.target_multiplier,
            stop_loss = %policy.stop_loss,
            take_profit = %policy.take_profit,
            "simulation activated"
        );

        self.session = Some(SimulationSession::new(policy));
        self.state = SimulatorState::Active;
        Ok(())
    }

    /// Settles `round` against the active session.
    pub fn settle(&mut self, round: &RoundEvent) -> SettleOutcome {
        let Some(session) = self.session.as_mut() else {
            return SettleOutcome::Idle;
        };
        session.observe();
        if self.state != SimulatorState::Active {
            return SettleOutcome::Idle;
        }

        if let Some(reason) = session.limit_reached() {
            info!(
                ?reason,
                profit = %session.cumulative_profit(),
                bets = session.bet_log().len(),
                "simulation stopped"
            );
            self.state = SimulatorState::Stopped(reason);
            return SettleOutcome::Stopped(reason);
        }

        SettleOutcome::Settled(session.place_bet(round))
    }

    /// Ends the session from any state, returning its final summary.
    pub fn deactivate(&mut self) -> Option<SessionSummary> {
        let summary = self.summary();
        if let Some(s) = &summary {
            info!(
                profit = %s.cumulative_profit,
                bets = s.games_played,
                "simulation deactivated"
            );
        }
        self.session = None;
        self.state = SimulatorState::Inactive;
        summary
    }

    /// Current session summary, if a session exists.
    #[must_use]
    pub fn summary(&self) -> Option<SessionSummary> {
        self.session
            .as_ref()
            .map(|session| SessionSummary::from_session(session, self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BetOutcome;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rounds(values: &[f64]) -> Vec<RoundEvent> {
        values
            .iter()
            .enumerate()
            .map(|(i, &m)| RoundEvent::new(m, i as i64).unwrap())
            .collect()
    }

    fn replay(policy: &SimulationPolicy, values: &[f64]) -> SessionSummary {
        let mut sim = PolicySimulator::new();
        sim.activate(policy.clone()).unwrap();
        for round in rounds(values) {
            sim.settle(&round);
        }
        sim.summary().unwrap()
    }

    // ============================================
    // Lifecycle
    // ============================================

    #[test]
    fn inactive_simulator_is_idle() {
        let mut sim = PolicySimulator::new();
        let outcome = sim.settle(&RoundEvent::new(2.0, 0).unwrap());
        assert_eq!(outcome, SettleOutcome::Idle);
        assert!(sim.summary().is_none());
        assert_eq!(sim.state(), SimulatorState::Inactive);
    }

    #[test]
    fn invalid_policy_leaves_simulator_unchanged() {
        let mut sim = PolicySimulator::new();
        let valid = SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        sim.activate(valid).unwrap();
        sim.settle(&RoundEvent::new(3.0, 0).unwrap());

        let invalid = SimulationPolicy {
            stake: dec!(0.01),
            target_multiplier: dec!(0.9),
            stop_loss: dec!(0.1),
            take_profit: dec!(0.5),
        };
        assert!(matches!(sim.activate(invalid), Err(PolicyError::TargetNotAboveOne(_))));
        assert!(sim.is_active());
        assert_eq!(sim.summary().unwrap().games_played, 1);
    }

    #[test]
    fn reactivation_replaces_session() {
        let policy = SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        let mut sim = PolicySimulator::new();
        sim.activate(policy.clone()).unwrap();
        sim.settle(&RoundEvent::new(3.0, 0).unwrap());
        sim.activate(policy).unwrap();

        let summary = sim.summary().unwrap();
        assert_eq!(summary.games_played, 0);
        assert_eq!(summary.virtual_balance, dec!(1.0));
    }

    #[test]
    fn deactivate_returns_summary_and_discards() {
        let policy = SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        let mut sim = PolicySimulator::new();
        sim.activate(policy).unwrap();
        sim.settle(&RoundEvent::new(1.5, 0).unwrap());

        let summary = sim.deactivate().unwrap();
        assert_eq!(summary.losses, 1);
        assert_eq!(sim.state(), SimulatorState::Inactive);
        assert!(sim.summary().is_none());
        assert!(sim.deactivate().is_none());
    }

    // ============================================
    // Deterministic replay
    // ============================================

    #[test]
    fn replay_is_deterministic() {
        let policy = SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        let values = [1.2, 2.5, 1.1, 3.0, 1.8];

        let first = replay(&policy, &values);
        let second = replay(&policy, &values);

        assert_eq!(first.bet_log, second.bet_log);
        assert_eq!(first.cumulative_profit, second.cumulative_profit);

        let outcomes: Vec<_> = first.bet_log.iter().map(|b| b.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                BetOutcome::Loss,
                BetOutcome::Win,
                BetOutcome::Loss,
                BetOutcome::Win,
                BetOutcome::Loss
            ]
        );
        assert_eq!(first.cumulative_profit, dec!(-0.01));
        assert_eq!(first.virtual_balance, dec!(0.99));
    }

    // ============================================
    // Stop conditions
    // ============================================

    #[test]
    fn stop_loss_stops_on_next_round_without_betting() {
        let policy = SimulationPolicy::new(dec!(0.1), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        let mut sim = PolicySimulator::new();
        sim.activate(policy).unwrap();

        let first = sim.settle(&RoundEvent::new(1.1, 0).unwrap());
        assert!(matches!(first, SettleOutcome::Settled(ref b) if b.outcome == BetOutcome::Loss));
        assert_eq!(sim.summary().unwrap().cumulative_profit, dec!(-0.1));

        let second = sim.settle(&RoundEvent::new(5.0, 1).unwrap());
        assert_eq!(second, SettleOutcome::Stopped(StopReason::StopLoss));
        assert_eq!(sim.state(), SimulatorState::Stopped(StopReason::StopLoss));
        assert_eq!(sim.summary().unwrap().bet_log.len(), 1);

        let third = sim.settle(&RoundEvent::new(5.0, 2).unwrap());
        assert_eq!(third, SettleOutcome::Idle);
        let summary = sim.summary().unwrap();
        assert_eq!(summary.bet_log.len(), 1);
        assert_eq!(summary.rounds_observed, 3);
    }

    #[test]
    fn take_profit_stops_session() {
        let policy = SimulationPolicy::new(dec!(0.25), dec!(2.0), dec!(1), dec!(0.5)).unwrap();
        let summary = replay(&policy, &[2.0, 2.0, 2.0, 2.0]);

        assert_eq!(summary.state, SimulatorState::Stopped(StopReason::TakeProfit));
        assert_eq!(summary.games_played, 2);
        assert_eq!(summary.cumulative_profit, dec!(0.5));
    }

    #[test]
    fn deactivate_from_stopped_returns_to_inactive() {
        let policy = SimulationPolicy::new(dec!(0.1), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap();
        let mut sim = PolicySimulator::new();
        sim.activate(policy).unwrap();
        sim.settle(&RoundEvent::new(1.0, 0).unwrap());
        sim.settle(&RoundEvent::new(1.0, 1).unwrap());

        let summary = sim.deactivate().unwrap();
        assert!(matches!(summary.state, SimulatorState::Stopped(_)));
        assert_eq!(summary.cumulative_profit, -Decimal::new(1, 1));
        assert_eq!(sim.state(), SimulatorState::Inactive);
    }

    #[test]
    fn state_serializes_with_reason() {
        let json = serde_json::to_value(SimulatorState::Stopped(StopReason::TakeProfit)).unwrap();
        assert_eq!(json["status"], "stopped");
        assert_eq!(json["reason"], "take-profit");
    }
}
