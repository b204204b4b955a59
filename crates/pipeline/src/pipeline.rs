//! Synchronous round pipeline.
//!
//! Every accepted round flows through the same fixed sequence: dedup record,
//! prediction scoring, history append, simulator settlement, then pattern
//! detection, recommendation and alert evaluation over the updated history.
//! Statistics are recomputed from the full retained history on each query.

use std::fmt;
use std::sync::Arc;

use crash_signal_core::{
    now_millis, CollaboratorError, Notification, Pattern, PersistenceStore, PipelineConfig,
    PolicyError, RawRound, Recommendation, RoundEvent, SignalProvider, ValidationError,
};
use crash_signal_signals::{AlertRules, PatternDetector, RuleRecommender, WindowSet};
use crash_signal_simulator::{
    PolicySimulator, PredictionAccuracy, PredictionTracker, SessionSummary, SettleOutcome,
    SimulationPolicy, SimulatorState,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::buffer::{HistoryBuffer, DEFAULT_CAPACITY};
use crate::dedup::Deduplicator;

/// Everything produced by accepting one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedRound {
    pub round: RoundEvent,
    pub recommendation: Recommendation,
    pub patterns: Vec<Pattern>,
    pub notifications: Vec<Notification>,
    pub settlement: SettleOutcome,
}

/// Result of offering a raw record to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Accepted(Box<AcceptedRound>),
    Duplicate,
    Rejected(ValidationError),
}

impl IngestOutcome {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    #[must_use]
    pub fn accepted(&self) -> Option<&AcceptedRound> {
        match self {
            Self::Accepted(accepted) => Some(accepted),
            _ => None,
        }
    }
}

/// Lifetime ingestion diagnostics. Not reset by `clear_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestCounters {
    pub accepted: u64,
    pub rejected: u64,
    pub duplicates: u64,
}

/// Point-in-time view of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub timestamp: i64,
    pub latest: Option<RoundEvent>,
    pub total_games: usize,
    pub windows: WindowSet,
    pub patterns: Vec<Pattern>,
    /// Always present; neutral until enough history has accumulated.
    pub prediction: Recommendation,
    pub provider: String,
    pub accuracy: PredictionAccuracy,
    pub accepted: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub simulation_active: bool,
    pub simulation: SimulatorState,
}

pub struct Pipeline {
    buffer: HistoryBuffer,
    dedup: Deduplicator,
    simulator: PolicySimulator,
    tracker: PredictionTracker,
    provider: Arc<dyn SignalProvider>,
    counters: IngestCounters,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("history", &self.buffer.len())
            .field("capacity", &self.buffer.capacity())
            .field("provider", &self.provider.name())
            .field("simulation", &self.simulator.state())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Pipeline {
    /// Creates an empty pipeline using the rule-based recommender.
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            buffer: HistoryBuffer::new(history_capacity),
            dedup: Deduplicator::new(),
            simulator: PolicySimulator::new(),
            tracker: PredictionTracker::new(),
            provider: Arc::new(RuleRecommender::new()),
            counters: IngestCounters::default(),
        }
    }

    #[must_use]
    pub fn with_config(config: &PipelineConfig) -> Self {
        Self::new(config.history_capacity)
    }

    /// Replaces the signal provider.
    #[must_use]
    pub fn with_signal_provider(mut self, provider: Arc<dyn SignalProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Swaps the active signal provider. History and sessions are kept.
    pub fn set_signal_provider(&mut self, provider: Arc<dyn SignalProvider>) {
        info!(from = self.provider.name(), to = provider.name(), "signal provider changed");
        self.provider = provider;
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validates, deduplicates and propagates a raw record at wall-clock time.
    pub fn ingest(&mut self, raw: RawRound) -> IngestOutcome {
        self.ingest_at(raw, now_millis())
    }

    /// Like [`Pipeline::ingest`] with an explicit insertion clock.
    pub fn ingest_at(&mut self, raw: RawRound, now_ms: i64) -> IngestOutcome {
        let round = match raw.validate(now_ms) {
            Ok(round) => round,
            Err(e) => {
                self.counters.rejected += 1;
                debug!(reason = e.reason_code(), error = %e, "round rejected");
                return IngestOutcome::Rejected(e);
            }
        };

        if self.dedup.is_duplicate(&round, now_ms) {
            self.counters.duplicates += 1;
            debug!(
                multiplier = round.multiplier,
                round_id = ?round.round_id,
                "duplicate round dropped"
            );
            return IngestOutcome::Duplicate;
        }

        IngestOutcome::Accepted(Box::new(self.accept(round, now_ms)))
    }

    fn accept(&mut self, round: RoundEvent, now_ms: i64) -> AcceptedRound {
        self.counters.accepted += 1;
        self.dedup.record(&round, now_ms);

        if let Some(correct) = self.tracker.observe(round.multiplier) {
            debug!(correct, multiplier = round.multiplier, "prediction scored");
        }

        self.buffer.append(round.clone());
        let settlement = self.simulator.settle(&round);

        let history = self.buffer.as_slice();
        let patterns = PatternDetector::detect(history);
        let recommendation = self.provider.recommend(history);
        self.tracker.issue(&recommendation, history.len());
        let notifications = AlertRules::evaluate(history, &recommendation, &patterns, now_ms);

        debug!(
            multiplier = round.multiplier,
            history = history.len(),
            action = ?recommendation.action,
            score = recommendation.score,
            "round accepted"
        );

        AcceptedRound {
            round,
            recommendation,
            patterns,
            notifications,
            settlement,
        }
    }

    /// Loads up to `n` stored rounds into history without propagation.
    ///
    /// Loaded rounds are recorded by the deduplicator at their own timestamp, so
    /// a live redelivery of a stored round with an id is still suppressed.
    ///
    /// # Errors
    /// Returns the store's error; the pipeline is left unchanged.
    pub fn warm_start(
        &mut self,
        store: &dyn PersistenceStore,
        n: usize,
    ) -> Result<usize, CollaboratorError> {
        let rounds = store.load_recent(n)?;
        let loaded = self.load_history(rounds);
        info!(loaded, requested = n, "warm start complete");
        Ok(loaded)
    }

    /// Appends already-validated rounds to history without propagation.
    pub fn load_history(&mut self, rounds: impl IntoIterator<Item = RoundEvent>) -> usize {
        let mut loaded = 0;
        for round in rounds {
            if self.dedup.is_duplicate(&round, round.timestamp) {
                continue;
            }
            self.dedup.record(&round, round.timestamp);
            self.buffer.append(round);
            loaded += 1;
        }
        loaded
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats_at(now_millis())
    }

    #[must_use]
    pub fn stats_at(&self, timestamp: i64) -> StatsSnapshot {
        let history = self.buffer.all();
        StatsSnapshot {
            timestamp,
            latest: self.buffer.latest().cloned(),
            total_games: history.len(),
            windows: WindowSet::compute(&history),
            patterns: PatternDetector::detect(&history),
            prediction: self.provider.recommend(&history),
            provider: self.provider.name().to_string(),
            accuracy: self.tracker.accuracy(),
            accepted: self.counters.accepted,
            rejected: self.counters.rejected,
            duplicates: self.counters.duplicates,
            simulation_active: self.simulator.is_active(),
            simulation: self.simulator.state(),
        }
    }

    /// Retained history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<RoundEvent> {
        self.buffer.all()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    #[must_use]
    pub const fn counters(&self) -> IngestCounters {
        self.counters
    }

    #[must_use]
    pub const fn prediction_accuracy(&self) -> PredictionAccuracy {
        self.tracker.accuracy()
    }

    /// Full reset: history, dedup windows, prediction scoring and any
    /// simulation session. Returns the summary of the discarded session.
    pub fn clear_data(&mut self) -> Option<SessionSummary> {
        let cleared = self.buffer.len();
        self.buffer.clear();
        self.dedup.clear();
        self.tracker.clear();
        let summary = self.simulator.deactivate();
        info!(cleared, "pipeline data cleared");
        summary
    }

    /// Starts a fresh simulation session.
    ///
    /// # Errors
    /// Returns `PolicyError` for an invalid policy; any running session is kept.
    pub fn activate_simulation(&mut self, policy: SimulationPolicy) -> Result<(), PolicyError> {
        self.simulator.activate(policy)
    }

    pub fn deactivate_simulation(&mut self) -> Option<SessionSummary> {
        self.simulator.deactivate()
    }

    #[must_use]
    pub fn simulation_stats(&self) -> Option<SessionSummary> {
        self.simulator.summary()
    }

    #[must_use]
    pub const fn simulation_state(&self) -> SimulatorState {
        self.simulator.state()
    }
}
