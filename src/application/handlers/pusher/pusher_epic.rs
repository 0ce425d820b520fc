//! PusherEpic - The four pusher epics combined behind one registration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::pusher::{PusherAction, PusherError};
use crate::ports::{ActionRegistry, ActionSink, Epic, MessagingClientFactory};

use super::{ClientSlot, ConnectEpic, DisconnectEpic, SubscribeEpic, UnsubscribeEpic};

/// Runs several epics as one.
///
/// Every epic sees every action. The first failure is returned and any
/// later ones are logged.
pub struct CombinedEpic {
    epics: Vec<Arc<dyn Epic>>,
}

/// Combines `epics` into a single epic that runs them in order.
pub fn combine_epics(epics: Vec<Arc<dyn Epic>>) -> CombinedEpic {
    CombinedEpic { epics }
}

#[async_trait]
impl Epic for CombinedEpic {
    async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError> {
        let mut first_error = None;

        for epic in &self.epics {
            if let Err(e) = epic.handle(action, sink).await {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    tracing::warn!(epic = epic.name(), error = %e, "Additional epic failure");
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "CombinedEpic"
    }
}

/// Bridges pusher intents to a messaging client.
///
/// Owns the client slot shared by the connect, disconnect, subscribe and
/// unsubscribe epics. Register it once with a pipeline:
///
/// ```ignore
/// let store = ActionStore::new();
/// let epic = Arc::new(PusherEpic::new(Arc::new(InMemoryMessagingFactory::new())));
/// epic.register(&store);
///
/// store.dispatch(PusherAction::connect("app-key", json!({})))?;
/// ```
pub struct PusherEpic {
    slot: ClientSlot,
    inner: CombinedEpic,
}

impl PusherEpic {
    pub fn new(factory: Arc<dyn MessagingClientFactory>) -> Self {
        let slot = ClientSlot::new();
        let inner = combine_epics(vec![
            Arc::new(ConnectEpic::new(factory, slot.clone())) as Arc<dyn Epic>,
            Arc::new(DisconnectEpic::new(slot.clone())),
            Arc::new(SubscribeEpic::new(slot.clone())),
            Arc::new(UnsubscribeEpic::new(slot.clone())),
        ]);
        Self { slot, inner }
    }

    /// The slot holding the current messaging client.
    pub fn client_slot(&self) -> &ClientSlot {
        &self.slot
    }

    /// Adds this epic to `registry`.
    pub fn register(self: &Arc<Self>, registry: &impl ActionRegistry) {
        registry.add_epic(self.clone());
    }
}

#[async_trait]
impl Epic for PusherEpic {
    async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError> {
        self.inner.handle(action, sink).await
    }

    fn name(&self) -> &'static str {
        "PusherEpic"
    }
}
