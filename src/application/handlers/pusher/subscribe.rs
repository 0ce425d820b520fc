//! SubscribeEpic - Subscribes channels and forwards their messages.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::pusher::{ChannelName, PusherAction, PusherError};
use crate::ports::{ActionSink, Epic, MessageHandler};

use super::ClientSlot;

/// Emits a message-received action for every message on a bound event.
///
/// The action carries the channel as it appeared in the subscribe intent,
/// not the formatted name.
pub struct ChannelMessageForwarder {
    channel: String,
    sink: ActionSink,
}

impl ChannelMessageForwarder {
    pub fn new(channel: impl Into<String>, sink: ActionSink) -> Self {
        Self {
            channel: channel.into(),
            sink,
        }
    }
}

impl MessageHandler for ChannelMessageForwarder {
    fn handle(&self, message: JsonValue) {
        let action = PusherAction::message_received(self.channel.clone(), message);
        if let Err(e) = self.sink.emit(action) {
            tracing::warn!(channel = %self.channel, error = %e, "Dropping received message");
        }
    }

    fn name(&self) -> &'static str {
        "ChannelMessageForwarder"
    }
}

/// Handles `@@pusher/SUBSCRIBE_CHANNEL`.
///
/// Subscribes the formatted channel name and binds one forwarder per listed
/// event. Fails with `NotConnected` when no client exists.
pub struct SubscribeEpic {
    slot: ClientSlot,
}

impl SubscribeEpic {
    pub fn new(slot: ClientSlot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Epic for SubscribeEpic {
    async fn handle(&self, action: &PusherAction, sink: &ActionSink) -> Result<(), PusherError> {
        let PusherAction::SubscribeChannel { channel, events } = action else {
            return Ok(());
        };

        let client = self.slot.current().await.ok_or(PusherError::NotConnected)?;
        let name = ChannelName::parse(channel)?;
        if name.is_private() {
            tracing::debug!(channel = %name, "Subscribing to a private channel; authorization is left to the client");
        }

        let subscription = client.subscribe(&name);
        for event in events {
            subscription.bind(event, Arc::new(ChannelMessageForwarder::new(channel.clone(), sink.clone())));
        }

        tracing::info!(channel = %name, events = events.len(), "Subscribed to channel");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SubscribeEpic"
    }
}
