//! UnsubscribeEpic - Leaves channels for unsubscribe intents.

use async_trait::async_trait;

use crate::domain::pusher::{ChannelName, PusherAction, PusherError};
use crate::ports::{ActionSink, Epic};

use super::ClientSlot;

/// Handles `@@pusher/UNSUBSCRIBE_CHANNEL`.
///
/// Looks the channel up by its formatted name and unsubscribes it when
/// present. Unknown channels, blank names and a missing client are no-ops.
pub struct UnsubscribeEpic {
    slot: ClientSlot,
}

impl UnsubscribeEpic {
    pub fn new(slot: ClientSlot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Epic for UnsubscribeEpic {
    async fn handle(&self, action: &PusherAction, _sink: &ActionSink) -> Result<(), PusherError> {
        let PusherAction::UnsubscribeChannel { channel } = action else {
            return Ok(());
        };

        let Some(client) = self.slot.current().await else {
            tracing::debug!(channel = %channel, "Unsubscribe requested without a messaging client");
            return Ok(());
        };
        let Ok(name) = ChannelName::parse(channel) else {
            return Ok(());
        };

        match client.channel(&name) {
            Some(subscription) => {
                subscription.unsubscribe();
                tracing::info!(channel = %name, "Unsubscribed from channel");
            }
            None => tracing::debug!(channel = %name, "No active subscription to remove"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "UnsubscribeEpic"
    }
}
