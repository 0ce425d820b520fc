//! DisconnectEpic - Closes the messaging client for disconnect intents.

use async_trait::async_trait;

use crate::domain::pusher::{PusherAction, PusherError};
use crate::ports::{ActionSink, Epic};

use super::ClientSlot;

/// Handles `@@pusher/DISCONNECT`. Emits nothing.
pub struct DisconnectEpic {
    slot: ClientSlot,
}

impl DisconnectEpic {
    pub fn new(slot: ClientSlot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Epic for DisconnectEpic {
    async fn handle(&self, action: &PusherAction, _sink: &ActionSink) -> Result<(), PusherError> {
        if !matches!(action, PusherAction::Disconnect) {
            return Ok(());
        }

        match self.slot.take().await {
            Some(client) => {
                client.disconnect();
                tracing::info!(key = %client.key(), "Messaging client disconnected");
            }
            None => tracing::debug!("Disconnect requested without a messaging client"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DisconnectEpic"
    }
}
