use std::fmt;
use std::sync::Arc;

use crash_signal_core::{PolicyError, RawRound, RoundEvent, SignalProvider};
use crash_signal_simulator::{SessionSummary, SimulationPolicy};
use tokio::sync::oneshot;

use crate::pipeline::{IngestOutcome, StatsSnapshot};

/// Requests handled by the pipeline actor, in arrival order.
pub enum PipelineCommand {
    /// Offer a raw record. `reply` is `None` for fire-and-forget submission.
    Ingest {
        raw: RawRound,
        reply: Option<oneshot::Sender<IngestOutcome>>,
    },
    GetStats(oneshot::Sender<StatsSnapshot>),
    GetHistory(oneshot::Sender<Vec<RoundEvent>>),
    ClearData(oneshot::Sender<Option<SessionSummary>>),
    ActivateSimulation {
        policy: SimulationPolicy,
        reply: oneshot::Sender<Result<(), PolicyError>>,
    },
    DeactivateSimulation(oneshot::Sender<Option<SessionSummary>>),
    GetSimulation(oneshot::Sender<Option<SessionSummary>>),
    SetSignalProvider(Arc<dyn SignalProvider>),
    Shutdown,
}

impl fmt::Debug for PipelineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest { raw, reply } => f
                .debug_struct("Ingest")
                .field("raw", raw)
                .field("awaits_reply", &reply.is_some())
                .finish(),
            Self::GetStats(_) => f.write_str("GetStats"),
            Self::GetHistory(_) => f.write_str("GetHistory"),
            Self::ClearData(_) => f.write_str("ClearData"),
            Self::ActivateSimulation { policy, .. } => f
                .debug_struct("ActivateSimulation")
                .field("policy", policy)
                .finish_non_exhaustive(),
            Self::DeactivateSimulation(_) => f.write_str("DeactivateSimulation"),
            Self::GetSimulation(_) => f.write_str("GetSimulation"),
            Self::SetSignalProvider(provider) => f
                .debug_tuple("SetSignalProvider")
                .field(&provider.name())
                .finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
