//! Fixed betting policy and its settlement rule.

use crash_signal_core::{PolicyError, SimulationDefaults};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a single settled bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetOutcome {
    Win,
    Loss,
}

/// Fixed stake, fixed cash-out target, absolute stop-loss and take-profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPolicy {
    pub stake: Decimal,
    pub target_multiplier: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl SimulationPolicy {
    /// Creates a validated policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if the stake, stop-loss or take-profit is not
    /// positive, or the target is not above 1.0.
    pub fn new(
        stake: Decimal,
        target_multiplier: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            stake,
            target_multiplier,
            stop_loss,
            take_profit,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Builds a policy from configured defaults.
    ///
    /// # Errors
    /// Returns `PolicyError` if the configured values are invalid.
    pub fn from_defaults(defaults: &SimulationDefaults) -> Result<Self, PolicyError> {
        Self::new(
            defaults.stake,
            defaults.target,
            defaults.stop_loss,
            defaults.take_profit,
        )
    }

    /// Checks the policy invariants.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.stake <= Decimal::ZERO {
            return Err(PolicyError::NonPositiveStake(self.stake.to_string()));
        }
        if self.target_multiplier <= Decimal::ONE {
            return Err(PolicyError::TargetNotAboveOne(
                self.target_multiplier.to_string(),
            ));
        }
        if self.stop_loss <= Decimal::ZERO {
            return Err(PolicyError::NonPositiveStopLoss(self.stop_loss.to_string()));
        }
        if self.take_profit <= Decimal::ZERO {
            return Err(PolicyError::NonPositiveTakeProfit(
                self.take_profit.to_string(),
            ));
        }
        Ok(())
    }

    /// Settles one bet against a crash point.
    ///
    /// A win pays `stake * (target - 1)`; a loss forfeits the stake.
    #[must_use]
    pub fn settle(&self, multiplier: f64) -> (BetOutcome, Decimal) {
        let target = self.target_multiplier.to_f64().unwrap_or(f64::INFINITY);
        if multiplier >= target {
            (
                BetOutcome::Win,
                self.stake * (self.target_multiplier - Decimal::ONE),
            )
        } else {
            (BetOutcome::Loss, -self.stake)
        }
    }
}
