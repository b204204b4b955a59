use crate::error::CollaboratorError;
use crate::round::{RawRound, RoundEvent};
use crate::signal::{Notification, Recommendation};
use anyhow::Result;
use async_trait::async_trait;

/// A source of raw round observations.
///
/// Feeds may deliver duplicates and out-of-order records; the pipeline
/// compensates. `Ok(None)` means the feed is exhausted.
#[async_trait]
pub trait SourceFeed: Send {
    async fn next_round(&mut self) -> Result<Option<RawRound>>;
}

/// Produces a recommendation from the accepted history, oldest first.
///
/// Implementations must return `Recommendation::neutral()` when the history is
/// too short to judge rather than failing.
pub trait SignalProvider: Send + Sync {
    fn recommend(&self, history: &[RoundEvent]) -> Recommendation;
    fn name(&self) -> &str;
}

/// Receives user-facing alerts. Delivery is best-effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), CollaboratorError>;
}

/// Durable append-only log of accepted rounds.
pub trait PersistenceStore: Send + Sync {
    fn append(&self, round: &RoundEvent) -> Result<(), CollaboratorError>;

    /// Returns up to `n` of the most recently appended rounds, oldest first.
    fn load_recent(&self, n: usize) -> Result<Vec<RoundEvent>, CollaboratorError>;

    fn clear(&self) -> Result<(), CollaboratorError>;
}
