//! Summary statistics for a simulation session.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::policy::{BetOutcome, SimulationPolicy};
use crate::session::{SettledBet, SimulationSession};
use crate::simulator::SimulatorState;

/// Snapshot of a session with derived performance figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub state: SimulatorState,
    pub policy: SimulationPolicy,
    pub starting_balance: Decimal,
    pub virtual_balance: Decimal,
    pub cumulative_profit: Decimal,
    /// Rounds the session saw, including ones after a stop.
    pub rounds_observed: u32,
    /// Bets settled.
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage of settled bets won.
    pub win_rate: f64,
    pub total_staked: Decimal,
    /// Profit as a percentage of the total staked.
    pub roi: f64,
    /// Largest peak-to-trough fall in cumulative profit.
    pub max_drawdown: Decimal,
    pub max_consecutive_losses: u32,
    pub bet_log: Vec<SettledBet>,
}

impl SessionSummary {
    /// Builds a summary from a session and the simulator state it is in.
    #[must_use]
    pub fn from_session(session: &SimulationSession, state: SimulatorState) -> Self {
        let bets = session.bet_log();

        let games_played = bets.len() as u32;
        let wins = bets.iter().filter(|b| b.outcome == BetOutcome::Win).count() as u32;
        let losses = games_played - wins;

        let win_rate = if games_played > 0 {
            f64::from(wins) / f64::from(games_played) * 100.0
        } else {
            0.0
        };

        let total_staked: Decimal = bets.iter().map(|b| b.stake).sum();
        let cumulative_profit = session.cumulative_profit();
        let roi = if total_staked > Decimal::ZERO {
            (cumulative_profit / total_staked * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        Self {
            state,
            policy: session.policy().clone(),
            starting_balance: session.starting_balance(),
            virtual_balance: session.virtual_balance(),
            cumulative_profit,
            rounds_observed: session.rounds_observed(),
            games_played,
            wins,
            losses,
            win_rate,
            total_staked,
            roi,
            max_drawdown: Self::calculate_max_drawdown(bets),
            max_consecutive_losses: Self::calculate_max_consecutive_losses(bets),
            bet_log: bets.to_vec(),
        }
    }

    /// Cumulative profit as a percentage of the starting balance.
    #[must_use]
    pub fn profit_percent(&self) -> f64 {
        if self.starting_balance.is_zero() {
            return 0.0;
        }
        (self.cumulative_profit / self.starting_balance * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    fn calculate_max_drawdown(bets: &[SettledBet]) -> Decimal {
        let mut peak = Decimal::ZERO;
        let mut equity = Decimal::ZERO;
        let mut max_dd = Decimal::ZERO;

        for bet in bets {
            equity += bet.profit_loss;
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak - equity;
            if drawdown > max_dd {
                max_dd = drawdown;
            }
        }

        max_dd
    }

    fn calculate_max_consecutive_losses(bets: &[SettledBet]) -> u32 {
        let mut current_streak = 0u32;
        let mut max_streak = 0u32;

        for bet in bets {
            if bet.outcome == BetOutcome::Loss {
                current_streak += 1;
                max_streak = max_streak.max(current_streak);
            } else {
                current_streak = 0;
            }
        }

        max_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_signal_core::RoundEvent;
    use rust_decimal_macros::dec;

    fn session_with(values: &[f64]) -> SimulationSession {
        let policy = SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(10), dec!(10)).unwrap();
        let mut session = SimulationSession::new(policy);
        for &m in values {
            session.place_bet(&RoundEvent::new(m, 0).unwrap());
        }
        session
    }

    #[test]
    fn empty_session_has_zero_rates() {
        let summary = SessionSummary::from_session(&session_with(&[]), SimulatorState::Active);
        assert_eq!(summary.games_played, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert_eq!(summary.max_drawdown, Decimal::ZERO);
    }

    #[test]
    fn counts_wins_losses_and_rates() {
        let summary = SessionSummary::from_session(
            &session_with(&[2.0, 1.0, 3.0, 1.5]),
            SimulatorState::Active,
        );

        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 2);
        assert!((summary.win_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.total_staked, dec!(0.04));
        assert_eq!(summary.cumulative_profit, Decimal::ZERO);
        assert_eq!(summary.roi, 0.0);
    }

    #[test]
    fn roi_is_percent_of_total_staked() {
        let summary = SessionSummary::from_session(
            &session_with(&[2.0, 2.0, 1.0, 2.0]),
            SimulatorState::Active,
        );
        // +0.02 on 0.04 staked
        assert!((summary.roi - 50.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_and_loss_streak() {
        let summary = SessionSummary::from_session(
            &session_with(&[2.0, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0]),
            SimulatorState::Active,
        );
        assert_eq!(summary.max_drawdown, dec!(0.03));
        assert_eq!(summary.max_consecutive_losses, 3);
    }

    #[test]
    fn profit_percent_of_starting_balance() {
        let summary =
            SessionSummary::from_session(&session_with(&[5.0; 3]), SimulatorState::Active);
        assert!((summary.profit_percent() - 3.0).abs() < 1e-9);
    }
}
