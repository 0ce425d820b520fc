//! Listeners that record or trace dispatched actions.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::pusher::PusherAction;
use crate::ports::ActionListener;

/// Records every action it sees.
///
/// Useful for test assertions and for inspecting a running pipeline.
///
/// # Example
///
/// ```ignore
/// let log = Arc::new(ActionLog::new());
/// store.add_listener(log.clone());
///
/// store.dispatch(action)?;
/// store.run_until_idle().await;
///
/// assert!(log.has_action(PUSHER_CONNECTION_SUCCESS));
/// ```
pub struct ActionLog {
    recorded: RwLock<Vec<PusherAction>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            recorded: RwLock::new(Vec::new()),
        }
    }

    /// Returns all recorded actions in dispatch order.
    pub fn actions(&self) -> Vec<PusherAction> {
        self.recorded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns actions with the given type tag.
    pub fn actions_of_type(&self, action_type: &str) -> Vec<PusherAction> {
        self.actions()
            .into_iter()
            .filter(|a| a.action_type() == action_type)
            .collect()
    }

    /// Returns actions for a specific channel.
    pub fn actions_for_channel(&self, channel: &str) -> Vec<PusherAction> {
        self.actions()
            .into_iter()
            .filter(|a| a.channel() == Some(channel))
            .collect()
    }

    pub fn has_action(&self, action_type: &str) -> bool {
        self.recorded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|a| a.action_type() == action_type)
    }

    pub fn count(&self) -> usize {
        self.recorded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Clears all recorded actions (for test isolation).
    pub fn clear(&self) {
        self.recorded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionListener for ActionLog {
    async fn on_action(&self, action: &PusherAction) {
        self.recorded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.clone());
    }

    fn name(&self) -> &'static str {
        "ActionLog"
    }
}

/// Emits a tracing event for every action.
///
/// Event actions are logged at `info`, intents at `debug`.
#[derive(Debug, Default)]
pub struct TracingListener;

#[async_trait]
impl ActionListener for TracingListener {
    async fn on_action(&self, action: &PusherAction) {
        match action {
            PusherAction::ConnectionSuccess { result } => {
                tracing::info!(result = %result, "Connected to messaging service");
            }
            PusherAction::ConnectionError { error } => {
                tracing::warn!(error = %error, "Messaging connection failed");
            }
            PusherAction::MessageReceived { channel, message } => {
                tracing::info!(channel = %channel, message = %message, "Message received");
            }
            intent => {
                tracing::debug!(
                    action_type = intent.action_type(),
                    channel = intent.channel(),
                    "Intent dispatched"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "TracingListener"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pusher::{PUSHER_MESSAGE_RECEIVED, PUSHER_UNSUBSCRIBE_CHANNEL};
    use serde_json::json;

    #[tokio::test]
    async fn records_actions_in_order() {
        let log = ActionLog::new();

        log.on_action(&PusherAction::subscribe("a", ["e"])).await;
        log.on_action(&PusherAction::message_received("a", json!(1))).await;

        assert_eq!(log.count(), 2);
        assert_eq!(log.actions()[1], PusherAction::message_received("a", json!(1)));
    }

    #[tokio::test]
    async fn filters_by_type_and_channel() {
        let log = ActionLog::new();

        log.on_action(&PusherAction::message_received("a", json!(1))).await;
        log.on_action(&PusherAction::message_received("b", json!(2))).await;
        log.on_action(&PusherAction::unsubscribe("a")).await;

        assert_eq!(log.actions_of_type(PUSHER_MESSAGE_RECEIVED).len(), 2);
        assert_eq!(log.actions_for_channel("a").len(), 2);
        assert!(log.has_action(PUSHER_UNSUBSCRIBE_CHANNEL));
    }

    #[tokio::test]
    async fn clear_removes_all_actions() {
        let log = ActionLog::new();
        log.on_action(&PusherAction::disconnect()).await;

        log.clear();

        assert_eq!(log.count(), 0);
    }

    #[tokio::test]
    async fn tracing_listener_accepts_every_action() {
        let listener = TracingListener;
        listener.on_action(&PusherAction::disconnect()).await;
        listener
            .on_action(&PusherAction::connection_error(json!({"code": 1})))
            .await;
    }
}
