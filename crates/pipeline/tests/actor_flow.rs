use std::sync::Arc;

use crash_signal_core::{Origin, PersistenceStore, PipelineConfig, RawRound, RoundEvent};
use crash_signal_data::{CsvRoundStore, MemoryRoundStore};
use crash_signal_pipeline::{
    pump, CsvReplayFeed, IngestOutcome, Pipeline, PipelineActor, SyntheticFeed,
};
use tempfile::TempDir;

#[tokio::test]
async fn rounds_survive_a_restart_through_the_csv_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rounds.csv");
    let config = PipelineConfig::default();

    {
        let store = Arc::new(CsvRoundStore::open(&path, 1_000).unwrap());
        let (actor, handle) = PipelineActor::create(Pipeline::default(), &config);
        let task = actor.with_store(store).spawn();

        let mut feed = SyntheticFeed::new(99).with_limit(40).starting_at(0);
        assert_eq!(pump(&mut feed, &handle).await.unwrap(), 40);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    let store = Arc::new(CsvRoundStore::open(&path, 1_000).unwrap());
    assert_eq!(store.len(), 40);

    let mut pipeline = Pipeline::new(config.history_capacity);
    assert_eq!(pipeline.warm_start(store.as_ref(), 25).unwrap(), 25);
    let history = pipeline.history();
    assert_eq!(history[0].round_id.as_deref(), Some("synthetic-99-0-15"));
    assert!(history.iter().all(|r| r.origin == Origin::SyntheticTest));

    let (actor, handle) = PipelineActor::create(pipeline, &config);
    let task = actor.with_store(store.clone()).spawn();

    let mut next_run = SyntheticFeed::new(7).with_limit(40).starting_at(40 * 30_000);
    pump(&mut next_run, &handle).await.unwrap();
    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.total_games, 65);
    assert_eq!(stats.accepted, 40);
    assert_eq!(stats.duplicates, 0);

    let redelivered = RawRound::from(history[24].clone());
    assert_eq!(handle.ingest(redelivered).await.unwrap(), IngestOutcome::Duplicate);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn clear_data_wipes_the_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(CsvRoundStore::open(dir.path().join("rounds.csv"), 100).unwrap());
    let (actor, handle) = PipelineActor::create(Pipeline::default(), &PipelineConfig::default());
    let task = actor.with_store(store.clone()).spawn();

    for i in 0..5 {
        handle
            .ingest(RawRound::from_multiplier(2.0).with_round_id(format!("c-{i}")))
            .await
            .unwrap();
    }
    handle.clear_data().await.unwrap();
    assert!(handle.history().await.unwrap().is_empty());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(store.load_recent(10).unwrap().is_empty());
}

#[tokio::test]
async fn csv_replay_feeds_a_running_pipeline() {
    let rounds: Vec<RoundEvent> = (0..12)
        .map(|i| RoundEvent::new(1.5 + f64::from(i) * 0.1, i64::from(i) * 1_000).unwrap())
        .collect();
    let (actor, handle) = PipelineActor::create(Pipeline::default(), &PipelineConfig::default());
    let task = actor.spawn();

    let mut feed = CsvReplayFeed::from_rounds(rounds.clone());
    pump(&mut feed, &handle).await.unwrap();

    let history = handle.history().await.unwrap();
    assert_eq!(history.len(), rounds.len());
    for (replayed, original) in history.iter().zip(&rounds) {
        assert_eq!(replayed.multiplier, original.multiplier);
        assert_eq!(replayed.timestamp, original.timestamp);
    }

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn a_new_synthetic_run_is_not_mistaken_for_the_stored_one() {
    let store = Arc::new(MemoryRoundStore::new(1_000));
    let config = PipelineConfig::default();

    let (actor, handle) = PipelineActor::create(Pipeline::default(), &config);
    let task = actor.with_store(store.clone()).spawn();
    let mut first = SyntheticFeed::new(1).with_limit(100).starting_at(0);
    pump(&mut first, &handle).await.unwrap();
    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert_eq!(store.load_recent(1_000).unwrap().len(), 100);

    let mut pipeline = Pipeline::new(config.history_capacity);
    assert_eq!(pipeline.warm_start(store.as_ref(), 100).unwrap(), 100);
    let (actor, handle) = PipelineActor::create(pipeline, &config);
    let task = actor.spawn();

    let mut second = SyntheticFeed::new(2).with_limit(100).starting_at(0);
    pump(&mut second, &handle).await.unwrap();
    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.accepted, 100);
    assert_eq!(stats.duplicates, 0);
    assert_eq!(stats.total_games, 200);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
