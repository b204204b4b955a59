//! Live pipeline: warm start, ingest from a feed, serve the web API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use crash_signal_core::{AppConfig, ConfigLoader, PersistenceStore, SourceFeed};
use crash_signal_data::CsvRoundStore;
use crash_signal_pipeline::{
    pump, JsonLinesFeed, LogNotificationSink, Pipeline, PipelineActor, PipelineHandle,
    SyntheticFeed,
};
use crash_signal_signals::SignalRegistry;
use crash_signal_web_api::ApiServer;

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Config file path (defaults to config/Config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Generate this many synthetic rounds instead of reading JSON lines from stdin
    #[arg(long)]
    pub synthetic: Option<u64>,

    /// Seed for the synthetic feed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Delay between synthetic rounds in milliseconds
    #[arg(long, default_value_t = 0)]
    pub interval_ms: u64,

    /// Signal provider driving recommendations
    #[arg(long, default_value = "rules")]
    pub provider: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    }
}

/// Runs the live pipeline until Ctrl-C is received or the web server fails.
///
/// # Errors
/// Returns an error if configuration, the round store, or the web server fail
/// to start.
pub async fn run_pipeline(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    tracing::info!(
        history = config.pipeline.history_capacity,
        store = %config.storage.path,
        "starting crash signal pipeline"
    );

    let store: Arc<dyn PersistenceStore> = Arc::new(
        CsvRoundStore::open(&config.storage.path, config.storage.retention)
            .context("Failed to open round store")?,
    );

    let registry = SignalRegistry::default();
    let provider = registry.get(&args.provider).with_context(|| {
        format!(
            "unknown signal provider {:?} (available: {})",
            args.provider,
            registry.names().join(", ")
        )
    })?;

    let mut pipeline = Pipeline::with_config(&config.pipeline).with_signal_provider(provider);
    if let Err(e) = pipeline.warm_start(store.as_ref(), config.storage.warm_start) {
        tracing::warn!(error = %e, "warm start failed, starting with empty history");
    }

    let (actor, handle) = PipelineActor::create(pipeline, &config.pipeline);
    let actor_task = actor
        .with_store(store)
        .with_sink(Arc::new(LogNotificationSink))
        .spawn();

    let server = ApiServer::new(handle.clone(), config.simulation.clone());
    let server_config = config.server.clone();
    let server_task = tokio::spawn(async move { server.serve(&server_config).await });

    let feed_handle = handle.clone();
    let feed_task = tokio::spawn(async move { run_feed(&args, &feed_handle).await });

    tokio::select! {
        result = server_task => {
            result.context("web server task panicked")??;
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Ctrl-C received, shutting down");
        }
    }

    feed_task.abort();
    shutdown(&handle).await;
    actor_task.await.context("pipeline actor panicked")?;
    Ok(())
}

async fn run_feed(args: &RunArgs, handle: &PipelineHandle) -> Result<usize> {
    let mut feed: Box<dyn SourceFeed> = match args.synthetic {
        Some(limit) => {
            tracing::info!(limit, seed = args.seed, "feeding synthetic rounds");
            let mut feed = SyntheticFeed::new(args.seed).with_limit(limit);
            if args.interval_ms > 0 {
                feed = feed.with_interval(Duration::from_millis(args.interval_ms));
            }
            Box::new(feed)
        }
        None => {
            tracing::info!("reading JSON lines from stdin");
            Box::new(JsonLinesFeed::stdin())
        }
    };

    let result = pump(feed.as_mut(), handle).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "feed stopped");
    }
    result
}

async fn shutdown(handle: &PipelineHandle) {
    if let Err(e) = handle.shutdown().await {
        tracing::warn!(error = %e, "pipeline already stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_config_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[pipeline]\nhistory_capacity = 64\n\n[server]\nport = 9090").unwrap();
        drop(file);

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.pipeline.history_capacity, 64);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.retention, 10_000);
    }
}
