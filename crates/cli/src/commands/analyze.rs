//! Offline analysis of captured rounds.

#![allow(clippy::format_push_string)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use crash_signal_core::{Origin, Recommendation};
use crash_signal_data::read_rounds;
use crash_signal_pipeline::{Pipeline, StatsSnapshot};
use crash_signal_signals::{SignalRegistry, WindowStats, FREQUENCY_THRESHOLDS};
use serde::Serialize;

use super::replay::replay_into;

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// CSV file of rounds
    #[arg(short, long)]
    pub data: PathBuf,

    /// Rounds kept in history (defaults to the whole file)
    #[arg(long)]
    pub history: Option<usize>,

    /// Print the stats snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the analyze command.
///
/// # Errors
/// Returns an error if the CSV cannot be read.
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let rounds = read_rounds(&args.data, Origin::ReplaySeed)?;
    let capacity = args.history.unwrap_or(rounds.len()).max(1);

    let mut pipeline = Pipeline::new(capacity);
    replay_into(&mut pipeline, rounds);
    let stats = pipeline.stats();
    let providers = SignalRegistry::default().recommend_all(&pipeline.history());

    if args.json {
        let output = AnalyzeOutput {
            stats: &stats,
            providers: &providers,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_stats(&stats));
        print!("{}", format_providers(&providers));
    }
    Ok(())
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(flatten)]
    stats: &'a StatsSnapshot,
    providers: &'a BTreeMap<String, Recommendation>,
}

fn format_providers(providers: &BTreeMap<String, Recommendation>) -> String {
    let mut output = String::from("\nProviders\n");
    for (name, rec) in providers {
        output.push_str(&format!(
            "  {name:<12} {:?} score {:>2} confidence {:?}\n",
            rec.action, rec.score, rec.confidence
        ));
    }
    output
}

fn format_window(label: &str, stats: Option<&WindowStats>) -> String {
    let Some(stats) = stats else {
        return format!("{label:<8} no data\n");
    };
    let mut line = format!(
        "{label:<8} n={:<4} avg {:>6.2}x  min {:>6.2}x  max {:>7.2}x  vol {:>6.2}  trend {:>+7.4}",
        stats.count, stats.average, stats.min, stats.max, stats.volatility, stats.trend
    );
    for threshold in FREQUENCY_THRESHOLDS {
        let _ = write!(line, "  >={threshold}x {:>5.1}%", stats.rate(threshold));
    }
    line.push('\n');
    line
}

fn format_stats(stats: &StatsSnapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!("Rounds analyzed: {}\n", stats.total_games));
    output.push_str(&format!(
        "Ingest: {} accepted, {} duplicates, {} rejected\n\n",
        stats.accepted, stats.duplicates, stats.rejected
    ));

    output.push_str("Windows\n");
    output.push_str(&format_window("last10", stats.windows.last10.as_ref()));
    output.push_str(&format_window("last20", stats.windows.last20.as_ref()));
    output.push_str(&format_window("last50", stats.windows.last50.as_ref()));
    output.push_str(&format_window("all", stats.windows.all.as_ref()));

    output.push_str("\nPatterns\n");
    if stats.patterns.is_empty() {
        output.push_str("  none\n");
    }
    for pattern in &stats.patterns {
        output.push_str(&format!(
            "  {:<18} {:<6} {}\n",
            pattern.kind.as_str(),
            format!("{:?}", pattern.confidence),
            pattern.description
        ));
    }

    let prediction = &stats.prediction;
    output.push_str(&format!(
        "\nSignal ({}): {:?} {} confidence {:?}, score {}\n",
        stats.provider,
        prediction.action,
        prediction
            .target
            .map_or_else(|| "-".to_string(), |t| format!("{t:.1}x")),
        prediction.confidence,
        prediction.score
    ));
    for reason in &prediction.reasons {
        output.push_str(&format!("  - {reason}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn analyze_reads_csv_and_reports_windows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rounds.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "multiplier").unwrap();
        for i in 0..25 {
            writeln!(file, "{}", 1.0 + f64::from(i % 5)).unwrap();
        }
        drop(file);

        let rounds = read_rounds(&path, Origin::ReplaySeed).unwrap();
        let mut pipeline = Pipeline::new(rounds.len());
        replay_into(&mut pipeline, rounds);
        let stats = pipeline.stats_at(0);

        assert_eq!(stats.total_games, 25);
        assert_eq!(stats.windows.last20.as_ref().unwrap().count, 20);

        let text = format_stats(&stats);
        assert!(text.contains("Rounds analyzed: 25"));
        assert!(text.contains("last50"));
        assert!(text.contains("Signal (rules)"));
    }

    #[test]
    fn provider_table_lists_every_provider() {
        let providers = SignalRegistry::default().recommend_all(&[]);
        let text = format_providers(&providers);
        assert!(text.contains("rules"));
        assert!(text.contains("Wait"));
    }

    #[test]
    fn empty_windows_print_no_data() {
        assert_eq!(format_window("last10", None), "last10   no data\n");
    }
}
