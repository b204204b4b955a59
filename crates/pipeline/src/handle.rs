use std::sync::Arc;

use anyhow::Result;
use crash_signal_core::{RawRound, RoundEvent, SignalProvider};
use crash_signal_simulator::{SessionSummary, SimulationPolicy};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::commands::PipelineCommand;
use crate::events::PipelineEvent;
use crate::pipeline::{IngestOutcome, StatsSnapshot};

/// Cloneable front door to a running [`PipelineActor`](crate::PipelineActor).
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<PipelineCommand>,
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl PipelineHandle {
    #[must_use]
    pub const fn new(
        tx: mpsc::Sender<PipelineCommand>,
        event_tx: broadcast::Sender<PipelineEvent>,
    ) -> Self {
        Self { tx, event_tx }
    }

    /// Offers a raw record and waits for the outcome.
    ///
    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn ingest(&self, raw: RawRound) -> Result<IngestOutcome> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::Ingest {
                raw,
                reply: Some(tx),
            })
            .await?;
        Ok(rx.await?)
    }

    /// Queues a raw record without waiting for the outcome.
    ///
    /// Waits only while the command queue is full.
    ///
    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn submit(&self, raw: RawRound) -> Result<()> {
        self.tx
            .send(PipelineCommand::Ingest { raw, reply: None })
            .await?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn stats(&self) -> Result<StatsSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(PipelineCommand::GetStats(tx)).await?;
        Ok(rx.await?)
    }

    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn history(&self) -> Result<Vec<RoundEvent>> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(PipelineCommand::GetHistory(tx)).await?;
        Ok(rx.await?)
    }

    /// Wipes history and ends any simulation session.
    ///
    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn clear_data(&self) -> Result<Option<SessionSummary>> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(PipelineCommand::ClearData(tx)).await?;
        Ok(rx.await?)
    }

    /// Starts a fresh simulation session.
    ///
    /// # Errors
    /// Returns the `PolicyError` for an invalid policy (downcastable), or an
    /// error if the actor has stopped.
    pub async fn activate_simulation(&self, policy: SimulationPolicy) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::ActivateSimulation { policy, reply: tx })
            .await?;
        rx.await??;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn deactivate_simulation(&self) -> Result<Option<SessionSummary>> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(PipelineCommand::DeactivateSimulation(tx)).await?;
        Ok(rx.await?)
    }

    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn simulation_stats(&self) -> Result<Option<SessionSummary>> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(PipelineCommand::GetSimulation(tx)).await?;
        Ok(rx.await?)
    }

    /// # Errors
    /// Returns an error if the actor has stopped.
    pub async fn set_signal_provider(&self, provider: Arc<dyn SignalProvider>) -> Result<()> {
        self.tx
            .send(PipelineCommand::SetSignalProvider(provider))
            .await?;
        Ok(())
    }

    /// Subscribes to pipeline events from this point on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// # Errors
    /// Returns an error if the actor has already stopped.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(PipelineCommand::Shutdown).await?;
        Ok(())
    }
}
