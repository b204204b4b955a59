//! Virtual balance and bet log for one simulation session.

use crash_signal_core::RoundEvent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::policy::{BetOutcome, SimulationPolicy};

/// Virtual balance every session starts from.
pub const STARTING_BALANCE: Decimal = dec!(1.0);

/// Which limit ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    StopLoss,
    TakeProfit,
}

/// A bet settled against one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledBet {
    pub stake: Decimal,
    pub target: Decimal,
    pub crash_value: f64,
    pub outcome: BetOutcome,
    pub profit_loss: Decimal,
    pub timestamp: i64,
}

/// State of one activation of the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSession {
    policy: SimulationPolicy,
    starting_balance: Decimal,
    virtual_balance: Decimal,
    bet_log: Vec<SettledBet>,
    rounds_observed: u32,
}

impl SimulationSession {
    /// Starts a session at the fixed starting balance with an empty log.
    #[must_use]
    pub fn new(policy: SimulationPolicy) -> Self {
        Self {
            policy,
            starting_balance: STARTING_BALANCE,
            virtual_balance: STARTING_BALANCE,
            bet_log: Vec::new(),
            rounds_observed: 0,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &SimulationPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn starting_balance(&self) -> Decimal {
        self.starting_balance
    }

    #[must_use]
    pub const fn virtual_balance(&self) -> Decimal {
        self.virtual_balance
    }

    #[must_use]
    pub fn cumulative_profit(&self) -> Decimal {
        self.virtual_balance - self.starting_balance
    }

    #[must_use]
    pub fn bet_log(&self) -> &[SettledBet] {
        &self.bet_log
    }

    /// Rounds delivered to this session, including ones not bet on.
    #[must_use]
    pub const fn rounds_observed(&self) -> u32 {
        self.rounds_observed
    }

    /// Returns the limit already reached by the cumulative profit, if any.
    #[must_use]
    pub fn limit_reached(&self) -> Option<StopReason> {
        let profit = self.cumulative_profit();
        if profit <= -self.policy.stop_loss {
            Some(StopReason::StopLoss)
        } else if profit >= self.policy.take_profit {
            Some(StopReason::TakeProfit)
        } else {
            None
        }
    }

    pub(crate) fn observe(&mut self) {
        self.rounds_observed += 1;
    }

    /// Settles a bet on `round` and appends it to the log.
    pub(crate) fn place_bet(&mut self, round: &RoundEvent) -> SettledBet {
        let (outcome, profit_loss) = self.policy.settle(round.multiplier);
        self.virtual_balance += profit_loss;

        let bet = SettledBet {
            stake: self.policy.stake,
            target: self.policy.target_multiplier,
            crash_value: round.multiplier,
            outcome,
            profit_loss,
            timestamp: round.timestamp,
        };
        self.bet_log.push(bet.clone());
        bet
    }
}
