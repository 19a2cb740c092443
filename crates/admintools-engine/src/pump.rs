use admintools_core::HostEvent;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::engine::{Engine, EngineSnapshot};

#[derive(Debug, Error)]
pub enum PumpError {
    /// The pump task has stopped and no longer accepts messages.
    #[error("event pump is closed")]
    Closed,
}

enum PumpMessage {
    Event(HostEvent),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<EngineSnapshot>),
}

/// Runs an [`Engine`] on its own task and feeds it events one at a time.
///
/// Handlers query the host when the pump reaches an event, not when it was
/// delivered. Callers that mutate host state between `deliver` and handling
/// should [`PumpHandle::flush`] first.
pub struct EventPump;

impl EventPump {
    /// Moves `engine` onto a tokio task. Must be called within a runtime.
    pub fn spawn(engine: Engine) -> PumpHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(engine, rx));
        PumpHandle { tx }
    }
}

/// Cloneable sender side of an [`EventPump`].
#[derive(Clone)]
pub struct PumpHandle {
    tx: mpsc::UnboundedSender<PumpMessage>,
}

impl PumpHandle {
    /// Queues an event without waiting; safe to call from synchronous host callbacks.
    ///
    /// Host state is read when the event is handled, which may be later.
    pub fn deliver(&self, event: HostEvent) -> Result<(), PumpError> {
        self.tx
            .send(PumpMessage::Event(event))
            .map_err(|_| PumpError::Closed)
    }

    /// Resolves once every event queued before this call has been handled.
    pub async fn flush(&self) -> Result<(), PumpError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PumpMessage::Flush(ack_tx))
            .map_err(|_| PumpError::Closed)?;
        ack_rx.await.map_err(|_| PumpError::Closed)
    }

    /// Drains queued events, clears engine state and stops the task.
    ///
    /// Returns the state as it was just before it was cleared.
    pub async fn shutdown(self) -> Result<EngineSnapshot, PumpError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PumpMessage::Shutdown(ack_tx))
            .map_err(|_| PumpError::Closed)?;
        ack_rx.await.map_err(|_| PumpError::Closed)
    }
}

async fn run(mut engine: Engine, mut rx: mpsc::UnboundedReceiver<PumpMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            PumpMessage::Event(event) => engine.handle(event),
            PumpMessage::Flush(ack) => {
                let _ = ack.send(());
            }
            PumpMessage::Shutdown(ack) => {
                let snapshot = engine.snapshot();
                engine.shutdown();
                let _ = ack.send(snapshot);
                return;
            }
        }
    }

    debug!("all pump handles dropped");
    engine.shutdown();
}
