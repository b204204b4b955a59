#![allow(clippy::format_push_string)]

use crate::accuracy::PredictionAccuracy;
use crate::metrics::SessionSummary;
use crate::simulator::SimulatorState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const LOSING_THRESHOLD: Decimal = dec!(-0.5);
const GOOD_WIN_RATE: f64 = 55.0;
const LOW_WIN_RATE: f64 = 45.0;
const GOOD_ACCURACY: f64 = 65.0;
const LOW_ACCURACY: f64 = 55.0;

const RULE_HEAVY: &str = "═══════════════════════════════════════════════════════════════\n";
const RULE_LIGHT: &str = "───────────────────────────────────────────────────────────────\n";

/// Overall judgement of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Profitable,
    BreakEven,
    Losing,
}

impl Verdict {
    #[must_use]
    pub fn from_profit(profit: Decimal) -> Self {
        if profit > Decimal::ZERO {
            Self::Profitable
        } else if profit < LOSING_THRESHOLD {
            Self::Losing
        } else {
            Self::BreakEven
        }
    }
}

pub struct SessionReportFormatter;

impl SessionReportFormatter {
    #[must_use]
    pub fn format(summary: &SessionSummary, accuracy: Option<&PredictionAccuracy>) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE_HEAVY);
        output.push_str("                SIMULATION SESSION REPORT                      \n");
        output.push_str(RULE_HEAVY);
        output.push('\n');

        output.push_str("Session\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!("State:                 {}\n", state_label(summary.state)));
        output.push_str(&format!(
            "Policy:                stake {} @ {}x (stop-loss {}, take-profit {})\n",
            summary.policy.stake,
            summary.policy.target_multiplier,
            summary.policy.stop_loss,
            summary.policy.take_profit
        ));
        output.push_str(&format!("Rounds Observed:       {:>4}\n", summary.rounds_observed));
        output.push_str(&format!("Bets Placed:           {:>4}\n", summary.games_played));
        output.push('\n');

        output.push_str("Balance\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!(
            "Virtual Balance:       {:.4} (started: {:.4})\n",
            summary.virtual_balance, summary.starting_balance
        ));
        output.push_str(&format!(
            "Profit/Loss:           {:.4} ({:.1}%)\n",
            summary.cumulative_profit,
            summary.profit_percent()
        ));
        output.push_str(&format!("Max Drawdown:          {:.4}\n", summary.max_drawdown));
        output.push('\n');

        output.push_str("Bets\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!("Wins:                  {:>4}\n", summary.wins));
        output.push_str(&format!("Losses:                {:>4}\n", summary.losses));
        output.push_str(&format!(
            "Max Losing Streak:     {:>4}\n",
            summary.max_consecutive_losses
        ));
        if summary.games_played > 0 {
            output.push_str(&format!("Win Rate:              {:.1}%\n", summary.win_rate));
            output.push_str(&format!("ROI:                   {:.1}%\n", summary.roi));
        } else {
            output.push_str("Win Rate:              N/A (no bets)\n");
        }

        if let Some(accuracy) = accuracy {
            output.push_str(&format!("Predictions Scored:    {:>4}\n", accuracy.total));
            output.push_str(&format!(
                "Prediction Accuracy:   {:.1}%\n",
                accuracy.accuracy()
            ));
        }

        output.push('\n');
        output.push_str("Analysis\n");
        output.push_str(RULE_LIGHT);
        output.push_str(match Verdict::from_profit(summary.cumulative_profit) {
            Verdict::Profitable => "PROFITABLE: these settings would have made money.\n",
            Verdict::Losing => "LOSING: these settings would have lost significant money.\n",
            Verdict::BreakEven => "BREAK-EVEN: these settings would be roughly neutral.\n",
        });

        if summary.games_played > 0 {
            if summary.win_rate > GOOD_WIN_RATE {
                output.push_str("Win rate is good (>55%).\n");
            } else if summary.win_rate < LOW_WIN_RATE {
                output.push_str(
                    "Win rate is low (<45%). Consider adjusting the target multiplier.\n",
                );
            }
        }

        if let Some(accuracy) = accuracy.filter(|a| a.total > 0) {
            let pct = accuracy.accuracy();
            if pct > GOOD_ACCURACY {
                output.push_str("Predictions are accurate (>65%).\n");
            } else if pct < LOW_ACCURACY {
                output.push_str("Prediction accuracy is low (<55%).\n");
            }
        }

        output.push('\n');
        output.push_str(RULE_HEAVY);
        output
    }
}

fn state_label(state: SimulatorState) -> &'static str {
    match state {
        SimulatorState::Inactive => "inactive",
        SimulatorState::Active => "active",
        SimulatorState::Stopped(crate::session::StopReason::StopLoss) => "stopped (stop-loss)",
        SimulatorState::Stopped(crate::session::StopReason::TakeProfit) => "stopped (take-profit)",
    }
}
