//! CLI commands for the crash signal pipeline.

pub mod analyze;
pub mod replay;
pub mod run;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use replay::{run_replay, ReplayArgs};
pub use run::{run_pipeline, RunArgs};
