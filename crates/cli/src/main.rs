use clap::{Parser, Subcommand};

mod commands;

use commands::{AnalyzeArgs, ReplayArgs, RunArgs};

#[derive(Parser)]
#[command(name = "crash-signal")]
#[command(
    about = "Crash round ingestion, signal analysis and risk-free policy simulation",
    long_about = None
)]
struct Cli {
    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live pipeline with the web API
    Run(RunArgs),
    /// Replay a CSV of rounds through a simulation session and print the report
    Replay(ReplayArgs),
    /// Analyze a CSV of rounds and print window statistics and the current signal
    Analyze(AnalyzeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    match cli.command {
        Commands::Run(args) => commands::run_pipeline(args).await?,
        Commands::Replay(args) => commands::run_replay(&args)?,
        Commands::Analyze(args) => commands::run_analyze(&args)?,
    }

    Ok(())
}
