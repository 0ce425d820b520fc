//! Action dispatch ports - Interfaces for participants in the action pipeline.
//!
//! Every dispatched action is shown to all listeners and then to all epics.
//! Epics may perform side effects and feed new actions back through an
//! `ActionSink`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::pusher::{PusherAction, PusherError};

/// Handle for feeding actions back into the pipeline.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct ActionSink {
    tx: mpsc::UnboundedSender<PusherAction>,
}

impl ActionSink {
    pub fn new(tx: mpsc::UnboundedSender<PusherAction>) -> Self {
        Self { tx }
    }

    /// Enqueues `action`. Fails once the pipeline has shut down.
    pub fn emit(&self, action: PusherAction) -> Result<(), PusherError> {
        self.tx.send(action).map_err(|_| PusherError::PipelineClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A side-effecting participant that reacts to actions.
///
/// Implementations should ignore action types they do not own.
///
/// # Example
///
/// ```ignore
/// struct PingEpic;
///
/// #[async_trait]
/// impl Epic for PingEpic {
///     async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError> {
///         if let PusherAction::Disconnect = action {
///             sink.emit(PusherAction::connect("key", json!({})))?;
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "PingEpic"
///     }
/// }
/// ```
#[async_trait]
pub trait Epic: Send + Sync {
    async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError>;

    /// Epic name for logging.
    fn name(&self) -> &'static str;
}

/// Observes every action flowing through the pipeline.
///
/// Listeners run before epics, so they see intents before any resulting
/// event actions.
#[async_trait]
pub trait ActionListener: Send + Sync {
    async fn on_action(&self, action: &PusherAction);

    /// Listener name for logging.
    fn name(&self) -> &'static str;
}

/// Registration surface of a dispatch pipeline.
pub trait ActionRegistry: Send + Sync {
    /// Registers an epic. Epics run in registration order.
    fn add_epic(&self, epic: Arc<dyn Epic>);

    /// Registers a listener. Listeners run in registration order.
    fn add_listener(&self, listener: Arc<dyn ActionListener>);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_epic_object_safe(_: &dyn Epic) {}

    #[allow(dead_code)]
    fn assert_listener_object_safe(_: &dyn ActionListener) {}

    #[allow(dead_code)]
    fn assert_registry_object_safe(_: &dyn ActionRegistry) {}

    #[test]
    fn sink_delivers_to_queue() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ActionSink::new(tx);

        sink.emit(PusherAction::disconnect()).unwrap();

        assert_eq!(rx.try_recv().unwrap(), PusherAction::Disconnect);
    }

    #[test]
    fn sink_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ActionSink::new(tx);
        drop(rx);

        assert!(sink.is_closed());
        assert!(matches!(
            sink.emit(PusherAction::disconnect()),
            Err(PusherError::PipelineClosed)
        ));
    }
}
