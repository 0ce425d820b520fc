//! ConnectEpic - Constructs the messaging client for connect intents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::pusher::{PusherAction, PusherError};
use crate::ports::{ActionSink, ConnectionEvents, Epic, MessagingClientFactory};

use super::ClientSlot;

/// Turns client connection callbacks into actions.
pub struct SinkConnectionEvents {
    sink: ActionSink,
}

impl SinkConnectionEvents {
    pub fn new(sink: ActionSink) -> Self {
        Self { sink }
    }

    fn emit(&self, action: PusherAction) {
        if let Err(e) = self.sink.emit(action) {
            tracing::warn!(error = %e, "Dropping connection event");
        }
    }
}

impl ConnectionEvents for SinkConnectionEvents {
    fn on_connected(&self, result: JsonValue) {
        self.emit(PusherAction::connection_success(result));
    }

    fn on_error(&self, error: JsonValue) {
        self.emit(PusherAction::connection_error(error));
    }
}

/// Handles `@@pusher/CONNECT`.
///
/// Constructs a client with the action's key and options and stores it in
/// the slot. A client already in the slot is disconnected first. When the
/// client cannot be constructed at all, the failure is emitted as a
/// connection-error action.
pub struct ConnectEpic {
    factory: Arc<dyn MessagingClientFactory>,
    slot: ClientSlot,
}

impl ConnectEpic {
    pub fn new(factory: Arc<dyn MessagingClientFactory>, slot: ClientSlot) -> Self {
        Self { factory, slot }
    }
}

#[async_trait]
impl Epic for ConnectEpic {
    async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError> {
        let PusherAction::Connect { key, options } = action else {
            return Ok(());
        };

        let events = Arc::new(SinkConnectionEvents::new(sink.clone()));
        match self.factory.connect(key, options, events) {
            Ok(client) => {
                if let Some(previous) = self.slot.replace(client).await {
                    tracing::info!(key = %previous.key(), "Replacing existing messaging client");
                    previous.disconnect();
                }
                tracing::info!(key = %key, "Messaging client constructed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Messaging client construction failed");
                sink.emit(PusherAction::connection_error(e.to_payload()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "ConnectEpic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryMessagingFactory;
    use crate::ports::MessagingClient;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn sink() -> (ActionSink, mpsc::UnboundedReceiver<PusherAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ActionSink::new(tx), rx)
    }

    #[tokio::test]
    async fn connect_constructs_exactly_one_client_with_parameters() {
        let factory = Arc::new(InMemoryMessagingFactory::new());
        let slot = ClientSlot::new();
        let epic = ConnectEpic::new(factory.clone(), slot.clone());
        let (sink, mut rx) = sink();

        epic.handle(&PusherAction::connect("app-key", json!({"cluster": "eu"})), &sink)
            .await
            .unwrap();

        assert_eq!(factory.construction_count(), 1);
        let client = factory.last_client().unwrap();
        assert_eq!(client.key(), "app-key");
        assert_eq!(client.options(), &json!({"cluster": "eu"}));
        assert!(slot.is_connected().await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn connected_callback_emits_one_success_action() {
        let factory = Arc::new(InMemoryMessagingFactory::new());
        let epic = ConnectEpic::new(factory.clone(), ClientSlot::new());
        let (sink, mut rx) = sink();

        epic.handle(&PusherAction::connect("k", json!({})), &sink).await.unwrap();
        factory.last_client().unwrap().emit_connected(json!({"socket_id": "1.1"}));

        assert_eq!(
            rx.try_recv().unwrap(),
            PusherAction::connection_success(json!({"socket_id": "1.1"}))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn error_callback_emits_one_error_action() {
        let factory = Arc::new(InMemoryMessagingFactory::new());
        let epic = ConnectEpic::new(factory.clone(), ClientSlot::new());
        let (sink, mut rx) = sink();

        epic.handle(&PusherAction::connect("k", json!({})), &sink).await.unwrap();
        factory.last_client().unwrap().emit_error(json!({"code": 4001}));

        assert_eq!(
            rx.try_recv().unwrap(),
            PusherAction::connection_error(json!({"code": 4001}))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn construction_failure_emits_error_action() {
        let factory = Arc::new(InMemoryMessagingFactory::failing(PusherError::connection("bad options")));
        let slot = ClientSlot::new();
        let epic = ConnectEpic::new(factory, slot.clone());
        let (sink, mut rx) = sink();

        epic.handle(&PusherAction::connect("k", json!({})), &sink).await.unwrap();

        match rx.try_recv().unwrap() {
            PusherAction::ConnectionError { error } => {
                assert_eq!(error["code"], "CONNECTION_FAILED");
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert!(!slot.is_connected().await);
    }

    #[tokio::test]
    async fn reconnect_disconnects_previous_client() {
        let factory = Arc::new(InMemoryMessagingFactory::new());
        let epic = ConnectEpic::new(factory.clone(), ClientSlot::new());
        let (sink, _rx) = sink();

        epic.handle(&PusherAction::connect("a", json!({})), &sink).await.unwrap();
        epic.handle(&PusherAction::connect("b", json!({})), &sink).await.unwrap();

        let clients = factory.clients();
        assert_eq!(clients[0].disconnect_count(), 1);
        assert_eq!(clients[1].disconnect_count(), 0);
    }

    #[tokio::test]
    async fn ignores_other_actions() {
        let factory = Arc::new(InMemoryMessagingFactory::new());
        let epic = ConnectEpic::new(factory.clone(), ClientSlot::new());
        let (sink, _rx) = sink();

        epic.handle(&PusherAction::disconnect(), &sink).await.unwrap();
        epic.handle(&PusherAction::subscribe("a", ["e"]), &sink).await.unwrap();

        assert_eq!(factory.construction_count(), 0);
    }
}
