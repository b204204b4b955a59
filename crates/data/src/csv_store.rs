use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crash_signal_core::{CollaboratorError, Origin, PersistenceStore, RoundEvent};
use csv::{ReaderBuilder, WriterBuilder};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One CSV row.
///
/// Format: timestamp,multiplier,round_id,origin
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoundRecord {
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(alias = "crashPoint", alias = "crash_point", alias = "bust")]
    multiplier: f64,
    #[serde(default, alias = "roundId", alias = "id")]
    round_id: Option<String>,
    #[serde(default)]
    origin: Option<String>,
}

impl From<&RoundEvent> for RoundRecord {
    fn from(round: &RoundEvent) -> Self {
        Self {
            timestamp: Some(round.timestamp),
            multiplier: round.multiplier,
            round_id: round.round_id.clone(),
            origin: Some(round.origin.as_str().to_string()),
        }
    }
}

impl RoundRecord {
    fn into_round(self, fallback_timestamp: i64, fallback_origin: Origin) -> Result<RoundEvent> {
        let origin = match self.origin.as_deref() {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => fallback_origin,
        };
        let timestamp = self.timestamp.unwrap_or(fallback_timestamp);
        let mut round = RoundEvent::new(self.multiplier, timestamp)?.with_origin(origin);
        round.round_id = self.round_id.filter(|id| !id.is_empty());
        Ok(round)
    }
}

/// Reads every valid round from a CSV file, oldest first.
///
/// Rows that cannot be decoded or fail validation are skipped and logged.
/// Rows without a timestamp use their row index; rows without an origin use
/// `default_origin`.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn read_rounds(path: impl AsRef<Path>, default_origin: Origin) -> Result<Vec<RoundEvent>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut rounds = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.deserialize::<RoundRecord>().enumerate() {
        let row = result
            .map_err(anyhow::Error::from)
            .and_then(|record| record.into_round(index as i64, default_origin));
        match row {
            Ok(round) => rounds.push(round),
            Err(e) => {
                skipped += 1;
                debug!(row = index + 1, error = %e, "skipping CSV row");
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped invalid CSV rows");
    }
    info!(path = %path.display(), rounds = rounds.len(), "loaded rounds from CSV");

    Ok(rounds)
}

/// Append-only CSV round log with bounded retention.
///
/// Once the file holds more than `retention` plus a tenth, it is rewritten
/// with the newest `retention` rows.
#[derive(Debug)]
pub struct CsvRoundStore {
    path: PathBuf,
    retention: usize,
    rows: Mutex<usize>,
}

impl CsvRoundStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created or an
    /// existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>, retention: usize) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let rows = if path.exists() {
            read_rounds(&path, Origin::ReplaySeed)?.len()
        } else {
            0
        };

        Ok(Self {
            path,
            retention: retention.max(1),
            rows: Mutex::new(rows),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        *self.rows.lock()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compaction_limit(&self) -> usize {
        self.retention + self.retention / 10
    }

    fn write_all(&self, rounds: &[RoundEvent]) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create CSV file: {}", self.path.display()))?;
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
        for round in rounds {
            writer.serialize(RoundRecord::from(round))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn append_row(&self, round: &RoundEvent, rows: &mut usize) -> Result<()> {
        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open CSV file: {}", self.path.display()))?;

        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(RoundRecord::from(round))?;
        writer.flush()?;
        *rows += 1;

        if *rows > self.compaction_limit() {
            let all = read_rounds(&self.path, Origin::ReplaySeed)?;
            let keep = &all[all.len().saturating_sub(self.retention)..];
            self.write_all(keep)?;
            debug!(kept = keep.len(), dropped = all.len() - keep.len(), "compacted round store");
            *rows = keep.len();
        }
        Ok(())
    }
}

impl PersistenceStore for CsvRoundStore {
    fn append(&self, round: &RoundEvent) -> Result<(), CollaboratorError> {
        let mut rows = self.rows.lock();
        self.append_row(round, &mut rows)
            .map_err(|e| CollaboratorError::persistence(format!("{e:#}")))
    }

    fn load_recent(&self, n: usize) -> Result<Vec<RoundEvent>, CollaboratorError> {
        let _guard = self.rows.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rounds = read_rounds(&self.path, Origin::ReplaySeed)
            .map_err(|e| CollaboratorError::persistence(format!("{e:#}")))?;
        let skip = rounds.len().saturating_sub(n);
        Ok(rounds.split_off(skip))
    }

    fn clear(&self) -> Result<(), CollaboratorError> {
        let mut rows = self.rows.lock();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(CollaboratorError::persistence)?;
        }
        *rows = 0;
        Ok(())
    }
}
