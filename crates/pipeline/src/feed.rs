//! Source feeds and the loop that forwards them into a running pipeline.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use crash_signal_core::{now_millis, Origin, RawRound, RoundEvent, SourceFeed};
use crash_signal_data::read_rounds;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::handle::PipelineHandle;

/// Spacing between synthetic round timestamps.
pub const SYNTHETIC_SPACING_MS: i64 = 30_000;

/// One JSON object per line. Blank and undecodable lines are skipped.
///
/// A bare number on a line is read as a multiplier.
pub struct JsonLinesFeed<R> {
    lines: Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesFeed<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Lines that could not be decoded so far.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl JsonLinesFeed<BufReader<Stdin>> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

fn decode_line(line: &str) -> Result<RawRound> {
    match serde_json::from_str::<RawRound>(line) {
        Ok(raw) => Ok(raw),
        Err(e) => line
            .parse::<f64>()
            .map(RawRound::from_multiplier)
            .map_err(|_| e.into()),
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> SourceFeed for JsonLinesFeed<R> {
    async fn next_round(&mut self) -> Result<Option<RawRound>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read feed line")?
        {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode_line(line) {
                Ok(raw) => return Ok(Some(raw)),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(
                        line = self.line_no,
                        error = %e,
                        "skipping undecodable feed line"
                    );
                }
            }
        }
        Ok(None)
    }
}

/// Seeded pseudo-random rounds for demos and tests.
///
/// Multipliers are uniform in [1, 6) rounded to two decimals. The same seed
/// always yields the same sequence. Round ids carry the seed and start time,
/// so separate runs never share ids.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    rng: ChaCha8Rng,
    seed: u64,
    produced: u64,
    limit: Option<u64>,
    interval: Option<Duration>,
    start_ms: i64,
}

impl SyntheticFeed {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            produced: 0,
            limit: None,
            interval: None,
            start_ms: now_millis(),
        }
    }

    /// Stops after `limit` rounds.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sleeps for `interval` before each round.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the first round's timestamp.
    #[must_use]
    pub const fn starting_at(mut self, start_ms: i64) -> Self {
        self.start_ms = start_ms;
        self
    }

    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.produced
    }

    fn next_multiplier(&mut self) -> f64 {
        let value: f64 = self.rng.gen_range(1.0..6.0);
        (value * 100.0).round() / 100.0
    }
}

#[async_trait]
impl SourceFeed for SyntheticFeed {
    async fn next_round(&mut self) -> Result<Option<RawRound>> {
        if self.limit.is_some_and(|limit| self.produced >= limit) {
            return Ok(None);
        }
        if let Some(interval) = self.interval {
            tokio::time::sleep(interval).await;
        }

        let index = self.produced;
        self.produced += 1;
        let timestamp = self.start_ms + i64::try_from(index)? * SYNTHETIC_SPACING_MS;

        Ok(Some(
            RawRound::from_multiplier(self.next_multiplier())
                .with_round_id(format!("synthetic-{}-{}-{index}", self.seed, self.start_ms))
                .with_timestamp(timestamp)
                .with_origin(Origin::SyntheticTest),
        ))
    }
}

/// Replays rounds previously captured to CSV, tagged `ReplaySeed` unless the
/// file says otherwise.
///
/// Rows without an id get `replay-{timestamp}-{row}`, so repeated multipliers
/// arriving faster than the content window are still distinct rounds.
#[derive(Debug)]
pub struct CsvReplayFeed {
    rounds: std::iter::Enumerate<std::vec::IntoIter<RoundEvent>>,
}

impl CsvReplayFeed {
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_rounds(read_rounds(path, Origin::ReplaySeed)?))
    }

    #[must_use]
    pub fn from_rounds(rounds: Vec<RoundEvent>) -> Self {
        Self {
            rounds: rounds.into_iter().enumerate(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rounds.len()
    }
}

#[async_trait]
impl SourceFeed for CsvReplayFeed {
    async fn next_round(&mut self) -> Result<Option<RawRound>> {
        Ok(self.rounds.next().map(|(row, round)| {
            if round.round_id.is_some() {
                RawRound::from(round)
            } else {
                let id = format!("replay-{}-{row}", round.timestamp);
                RawRound::from(round).with_round_id(id)
            }
        }))
    }
}

/// Forwards every round from `feed` into the pipeline until it is exhausted.
///
/// Returns the number of rounds forwarded.
///
/// # Errors
/// Returns an error if the feed fails or the pipeline actor has stopped.
pub async fn pump<F>(feed: &mut F, handle: &PipelineHandle) -> Result<usize>
where
    F: SourceFeed + ?Sized,
{
    let mut forwarded = 0;
    while let Some(raw) = feed.next_round().await? {
        handle
            .submit(raw)
            .await
            .context("Pipeline stopped while feeding rounds")?;
        forwarded += 1;
    }
    tracing::info!(forwarded, "feed exhausted");
    Ok(forwarded)
}
