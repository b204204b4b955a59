//! Offline replay of captured rounds against a simulation policy.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use crash_signal_core::{Origin, RawRound, RoundEvent};
use crash_signal_data::read_rounds;
use crash_signal_pipeline::{IngestCounters, Pipeline};
use crash_signal_simulator::{
    PredictionAccuracy, SessionReportFormatter, SessionSummary, SimulationPolicy,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Insertion clock step between replayed rounds: one typical round interval.
pub const REPLAY_SPACING_MS: i64 = 30_000;

/// Arguments for the replay command.
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// CSV file of rounds (multiplier column required; timestamp, round_id, origin optional)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Fixed stake per bet
    #[arg(long, default_value = "0.01")]
    pub stake: Decimal,

    /// Cash-out target multiplier
    #[arg(long, default_value = "2.0")]
    pub target: Decimal,

    /// Stop once cumulative profit falls to minus this amount
    #[arg(long, default_value = "0.1")]
    pub stop_loss: Decimal,

    /// Stop once cumulative profit reaches this amount
    #[arg(long, default_value = "0.5")]
    pub take_profit: Decimal,

    /// Print the summary as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayOutput {
    summary: SessionSummary,
    accuracy: PredictionAccuracy,
    counters: IngestCounters,
}

/// Feeds `rounds` through `pipeline` in file order on the replay clock.
pub fn replay_into(pipeline: &mut Pipeline, rounds: Vec<RoundEvent>) -> IngestCounters {
    for (index, round) in rounds.into_iter().enumerate() {
        let clock = (index as i64).saturating_mul(REPLAY_SPACING_MS);
        pipeline.ingest_at(RawRound::from(round), clock);
    }
    pipeline.counters()
}

/// Runs `policy` over every round in `rounds` and returns the final summary.
///
/// # Errors
/// Returns an error if the policy is invalid.
pub fn simulate(
    rounds: Vec<RoundEvent>,
    policy: SimulationPolicy,
) -> Result<(SessionSummary, PredictionAccuracy, IngestCounters)> {
    let mut pipeline = Pipeline::new(rounds.len().max(1));
    pipeline.activate_simulation(policy)?;
    let counters = replay_into(&mut pipeline, rounds);
    let summary = pipeline
        .deactivate_simulation()
        .context("simulation session vanished during replay")?;
    Ok((summary, pipeline.prediction_accuracy(), counters))
}

/// Runs the replay command.
///
/// # Errors
/// Returns an error if the CSV cannot be read or the policy is invalid.
pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    let policy = SimulationPolicy::new(args.stake, args.target, args.stop_loss, args.take_profit)?;
    let rounds = read_rounds(&args.data, Origin::ReplaySeed)?;
    tracing::info!(rounds = rounds.len(), path = %args.data.display(), "replaying rounds");

    let (summary, accuracy, counters) = simulate(rounds, policy)?;

    if args.json {
        let output = ReplayOutput {
            summary,
            accuracy,
            counters,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", SessionReportFormatter::format(&summary, Some(&accuracy)));
        println!(
            "Rounds: {} accepted, {} duplicates, {} rejected",
            counters.accepted, counters.duplicates, counters.rejected
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_signal_simulator::BetOutcome;
    use rust_decimal_macros::dec;

    fn rounds(values: &[f64]) -> Vec<RoundEvent> {
        values
            .iter()
            .map(|&m| RoundEvent::new(m, 0).unwrap())
            .collect()
    }

    fn policy() -> SimulationPolicy {
        SimulationPolicy::new(dec!(0.01), dec!(2.0), dec!(0.1), dec!(0.5)).unwrap()
    }

    #[test]
    fn replay_settles_every_round() {
        let (summary, _, counters) =
            simulate(rounds(&[1.2, 2.5, 1.1, 3.0, 1.8]), policy()).unwrap();

        assert_eq!(counters.accepted, 5);
        assert_eq!(summary.games_played, 5);
        assert_eq!(summary.cumulative_profit, dec!(-0.01));
        assert_eq!(summary.bet_log[1].outcome, BetOutcome::Win);
    }

    #[test]
    fn identical_idless_rows_are_not_collapsed() {
        let (summary, _, counters) = simulate(rounds(&[2.0, 2.0, 2.0]), policy()).unwrap();
        assert_eq!(counters.duplicates, 0);
        assert_eq!(summary.games_played, 3);
    }

    #[test]
    fn repeated_ids_are_dropped() {
        let mut data = rounds(&[2.0, 2.0]);
        data[0].round_id = Some("same".to_string());
        data[1].round_id = Some("same".to_string());

        let (summary, _, counters) = simulate(data, policy()).unwrap();
        assert_eq!(counters.duplicates, 1);
        assert_eq!(summary.games_played, 1);
    }

    #[test]
    fn invalid_policy_fails_before_reading() {
        let args = ReplayArgs {
            data: PathBuf::from("does-not-exist.csv"),
            stake: dec!(0.01),
            target: dec!(1.0),
            stop_loss: dec!(0.1),
            take_profit: dec!(0.5),
            json: false,
        };
        let err = run_replay(&args).unwrap_err();
        assert!(err.to_string().contains("target multiplier"));
    }
}
