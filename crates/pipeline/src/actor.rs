use std::sync::Arc;

use crash_signal_core::{
    Notification, NotificationSink, PersistenceStore, PipelineConfig, RoundEvent,
};
use crash_signal_simulator::SettleOutcome;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::commands::PipelineCommand;
use crate::events::PipelineEvent;
use crate::handle::PipelineHandle;
use crate::pipeline::{AcceptedRound, IngestOutcome, Pipeline};

enum PersistOp {
    Append(RoundEvent),
    Clear,
}

/// Single blocking task applying store writes in submission order.
struct PersistenceWorker {
    tx: mpsc::UnboundedSender<PersistOp>,
    task: JoinHandle<()>,
}

impl PersistenceWorker {
    fn spawn(store: Arc<dyn PersistenceStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistOp>();
        let task = tokio::task::spawn_blocking(move || {
            while let Some(op) = rx.blocking_recv() {
                let result = match &op {
                    PersistOp::Append(round) => store.append(round),
                    PersistOp::Clear => store.clear(),
                };
                if let Err(e) = result {
                    tracing::warn!(error = %e, "round store write failed");
                }
            }
        });
        Self { tx, task }
    }

    fn submit(&self, op: PersistOp) {
        if self.tx.send(op).is_err() {
            tracing::warn!("round store worker is gone, dropping write");
        }
    }

    async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "round store worker panicked");
        }
    }
}

/// Owns the [`Pipeline`] and serializes every operation on it.
///
/// Persistence and notification delivery run off the command loop; their
/// failures are logged and never reach the producer.
pub struct PipelineActor {
    pipeline: Pipeline,
    rx: mpsc::Receiver<PipelineCommand>,
    event_tx: broadcast::Sender<PipelineEvent>,
    store: Option<Arc<dyn PersistenceStore>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl PipelineActor {
    #[must_use]
    pub fn new(
        pipeline: Pipeline,
        rx: mpsc::Receiver<PipelineCommand>,
        event_tx: broadcast::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            pipeline,
            rx,
            event_tx,
            store: None,
            sinks: Vec::new(),
        }
    }

    /// Creates the actor together with a handle wired to it.
    ///
    /// Channel sizes come from `config`; the actor does nothing until
    /// [`PipelineActor::spawn`] or [`PipelineActor::run`].
    #[must_use]
    pub fn create(pipeline: Pipeline, config: &PipelineConfig) -> (Self, PipelineHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (event_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        let handle = PipelineHandle::new(tx, event_tx.clone());
        (Self::new(pipeline, rx, event_tx), handle)
    }

    /// Persists every accepted round to `store`.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Delivers every raised notification to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Runs the actor on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drains commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(
            capacity = self.pipeline.capacity(),
            history = self.pipeline.len(),
            provider = self.pipeline.provider_name(),
            "pipeline actor starting"
        );

        let persistence = self.store.clone().map(PersistenceWorker::spawn);

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                PipelineCommand::Ingest { raw, reply } => {
                    let outcome = self.pipeline.ingest(raw);
                    if let IngestOutcome::Accepted(accepted) = &outcome {
                        if let Some(worker) = &persistence {
                            worker.submit(PersistOp::Append(accepted.round.clone()));
                        }
                        self.dispatch(accepted);
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(outcome);
                    }
                }
                PipelineCommand::GetStats(reply) => {
                    let _ = reply.send(self.pipeline.stats());
                }
                PipelineCommand::GetHistory(reply) => {
                    let _ = reply.send(self.pipeline.history());
                }
                PipelineCommand::ClearData(reply) => {
                    let summary = self.pipeline.clear_data();
                    if let Some(worker) = &persistence {
                        worker.submit(PersistOp::Clear);
                    }
                    if let Some(summary) = &summary {
                        let _ = self
                            .event_tx
                            .send(PipelineEvent::SimulationEnded(Box::new(summary.clone())));
                    }
                    let _ = self.event_tx.send(PipelineEvent::DataCleared);
                    let _ = reply.send(summary);
                }
                PipelineCommand::ActivateSimulation { policy, reply } => {
                    let result = self.pipeline.activate_simulation(policy);
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "simulation activation rejected");
                    }
                    let _ = reply.send(result);
                }
                PipelineCommand::DeactivateSimulation(reply) => {
                    let summary = self.pipeline.deactivate_simulation();
                    if let Some(summary) = &summary {
                        let _ = self
                            .event_tx
                            .send(PipelineEvent::SimulationEnded(Box::new(summary.clone())));
                    }
                    let _ = reply.send(summary);
                }
                PipelineCommand::GetSimulation(reply) => {
                    let _ = reply.send(self.pipeline.simulation_stats());
                }
                PipelineCommand::SetSignalProvider(provider) => {
                    self.pipeline.set_signal_provider(provider);
                }
                PipelineCommand::Shutdown => {
                    tracing::info!("pipeline actor shutting down");
                    break;
                }
            }
        }

        if let Some(worker) = persistence {
            worker.finish().await;
        }

        tracing::info!(counters = ?self.pipeline.counters(), "pipeline actor stopped");
    }

    fn dispatch(&self, accepted: &AcceptedRound) {
        let _ = self.event_tx.send(PipelineEvent::RoundAccepted {
            round: accepted.round.clone(),
            recommendation: accepted.recommendation.clone(),
            patterns: accepted.patterns.clone(),
        });

        match &accepted.settlement {
            SettleOutcome::Settled(bet) => {
                let _ = self.event_tx.send(PipelineEvent::BetSettled(bet.clone()));
            }
            SettleOutcome::Stopped(reason) => {
                let _ = self.event_tx.send(PipelineEvent::SimulationStopped(*reason));
            }
            SettleOutcome::Idle => {}
        }

        for notification in &accepted.notifications {
            let _ = self
                .event_tx
                .send(PipelineEvent::NotificationRaised(notification.clone()));
            self.notify_sinks(notification);
        }
    }

    fn notify_sinks(&self, notification: &Notification) {
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let notification = notification.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.notify(&notification).await {
                    tracing::warn!(error = %e, title = %notification.title, "notification failed");
                }
            });
        }
    }
}
