//! Round ingestion pipeline.
//!
//! [`Pipeline`] is the synchronous core: validation, dedup, bounded history,
//! simulation and signal evaluation. [`PipelineActor`] wraps it behind a
//! bounded command queue so any number of producers and readers can share it
//! through cloneable [`PipelineHandle`]s.

pub mod actor;
pub mod buffer;
pub mod commands;
pub mod dedup;
pub mod events;
pub mod feed;
pub mod handle;
pub mod notifier;
pub mod pipeline;

pub use actor::PipelineActor;
pub use buffer::HistoryBuffer;
pub use commands::PipelineCommand;
pub use dedup::Deduplicator;
pub use events::PipelineEvent;
pub use feed::{pump, CsvReplayFeed, JsonLinesFeed, SyntheticFeed};
pub use handle::PipelineHandle;
pub use notifier::LogNotificationSink;
pub use pipeline::{AcceptedRound, IngestCounters, IngestOutcome, Pipeline, StatsSnapshot};
