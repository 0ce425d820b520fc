//! ActionStore - The action dispatch pipeline.
//!
//! Actions are queued on an unbounded channel and processed one at a time:
//!
//! ```text
//! dispatch(action) ──▶ queue ──▶ listeners ──▶ epics
//!                        ▲                       │
//!                        └──── ActionSink ◀──────┘
//! ```
//!
//! ## Graceful Shutdown
//!
//! `run` listens for a shutdown signal and drains whatever is already queued
//! before returning.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{mpsc, watch, Mutex};

use crate::domain::pusher::{PusherAction, PusherError};
use crate::ports::{ActionListener, ActionRegistry, ActionSink, Epic};

pub struct ActionStore {
    tx: mpsc::UnboundedSender<PusherAction>,
    rx: Mutex<mpsc::UnboundedReceiver<PusherAction>>,
    epics: RwLock<Vec<Arc<dyn Epic>>>,
    listeners: RwLock<Vec<Arc<dyn ActionListener>>>,
}

impl ActionStore {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            epics: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Enqueues an action for processing.
    pub fn dispatch(&self, action: PusherAction) -> Result<(), PusherError> {
        self.tx.send(action).map_err(|_| PusherError::PipelineClosed)
    }

    /// Returns a handle that feeds the same queue.
    pub fn sink(&self) -> ActionSink {
        ActionSink::new(self.tx.clone())
    }

    /// Run the dispatch loop until shutdown signal is received.
    ///
    /// A dropped shutdown sender counts as a shutdown request.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), PusherError> {
        let mut rx = self.rx.lock().await;
        tracing::info!("Action store started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        let drained = self.drain(&mut rx).await;
                        tracing::info!(drained, "Action store stopped");
                        return Ok(());
                    }
                }

                action = rx.recv() => match action {
                    Some(action) => self.process(action).await,
                    None => return Err(PusherError::PipelineClosed),
                },
            }
        }
    }

    /// Processes queued actions until the queue is empty.
    ///
    /// Actions emitted while processing are handled in the same call.
    /// Returns how many actions were processed.
    pub async fn run_until_idle(&self) -> usize {
        let mut rx = self.rx.lock().await;
        self.drain(&mut rx).await
    }

    async fn drain(&self, rx: &mut mpsc::UnboundedReceiver<PusherAction>) -> usize {
        let mut processed = 0;
        while let Ok(action) = rx.try_recv() {
            self.process(action).await;
            processed += 1;
        }
        processed
    }

    async fn process(&self, action: PusherAction) {
        tracing::debug!(action_type = action.action_type(), "Processing action");

        // Clone participants to release locks before await points
        let listeners: Vec<Arc<dyn ActionListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let epics: Vec<Arc<dyn Epic>> = self
            .epics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener.on_action(&action).await;
        }

        let sink = self.sink();
        for epic in epics {
            if let Err(e) = epic.handle(&action, &sink).await {
                tracing::warn!(
                    epic = epic.name(),
                    action_type = action.action_type(),
                    error = %e,
                    "Epic failed to handle action"
                );
            }
        }
    }
}

impl Default for ActionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry for ActionStore {
    fn add_epic(&self, epic: Arc<dyn Epic>) {
        tracing::debug!(epic = epic.name(), "Registering epic");
        self.epics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(epic);
    }

    fn add_listener(&self, listener: Arc<dyn ActionListener>) {
        tracing::debug!(listener = listener.name(), "Registering listener");
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
