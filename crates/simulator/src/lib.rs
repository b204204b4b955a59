//! Risk-free policy simulation over the accepted round stream.
//!
//! Money is tracked in `Decimal` so that replaying the same rounds against the
//! same policy reproduces the same bet log exactly.

pub mod accuracy;
pub mod metrics;
pub mod policy;
pub mod report;
pub mod session;
pub mod simulator;

pub use accuracy::{PredictionAccuracy, PredictionTracker};
pub use metrics::SessionSummary;
pub use policy::{BetOutcome, SimulationPolicy};
pub use report::{SessionReportFormatter, Verdict};
pub use session::{SettledBet, SimulationSession, StopReason, STARTING_BALANCE};
pub use simulator::{PolicySimulator, SettleOutcome, SimulatorState};
