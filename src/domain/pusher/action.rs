//! The action vocabulary exchanged with the dispatch pipeline.
//!
//! Intent actions (`Connect`, `Disconnect`, `SubscribeChannel`,
//! `UnsubscribeChannel`) are dispatched by the application. Event actions
//! (`ConnectionSuccess`, `ConnectionError`, `MessageReceived`) are emitted by
//! the bridge when the messaging client reports something.
//!
//! Payload fields are opaque JSON and pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const PUSHER_CONNECT: &str = "@@pusher/CONNECT";
pub const PUSHER_DISCONNECT: &str = "@@pusher/DISCONNECT";
pub const PUSHER_CONNECTION_SUCCESS: &str = "@@pusher/CONNECTION_SUCCESS";
pub const PUSHER_CONNECTION_ERROR: &str = "@@pusher/CONNECTION_ERROR";
pub const PUSHER_SUBSCRIBE_CHANNEL: &str = "@@pusher/SUBSCRIBE_CHANNEL";
pub const PUSHER_UNSUBSCRIBE_CHANNEL: &str = "@@pusher/UNSUBSCRIBE_CHANNEL";
pub const PUSHER_MESSAGE_RECEIVED: &str = "@@pusher/MESSAGE_RECEIVED";

/// Every action the bridge consumes or produces.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"@@pusher/SUBSCRIBE_CHANNEL","channel":"orders","events":["created"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PusherAction {
    /// Dispatch to create a connection.
    #[serde(rename = "@@pusher/CONNECT")]
    Connect {
        key: String,
        #[serde(default)]
        options: JsonValue,
    },

    /// Dispatch to end the connection.
    #[serde(rename = "@@pusher/DISCONNECT")]
    Disconnect,

    /// Emitted when the connection is established.
    #[serde(rename = "@@pusher/CONNECTION_SUCCESS")]
    ConnectionSuccess {
        #[serde(default)]
        result: JsonValue,
    },

    /// Emitted when the connection could not be established.
    #[serde(rename = "@@pusher/CONNECTION_ERROR")]
    ConnectionError {
        #[serde(default)]
        error: JsonValue,
    },

    /// Dispatch to subscribe to a channel and bind the listed events.
    #[serde(rename = "@@pusher/SUBSCRIBE_CHANNEL")]
    SubscribeChannel {
        channel: String,
        #[serde(default)]
        events: Vec<String>,
    },

    /// Dispatch to leave a channel.
    #[serde(rename = "@@pusher/UNSUBSCRIBE_CHANNEL")]
    UnsubscribeChannel { channel: String },

    /// Emitted for every message delivered on a bound event.
    #[serde(rename = "@@pusher/MESSAGE_RECEIVED")]
    MessageReceived {
        channel: String,
        #[serde(default)]
        message: JsonValue,
    },
}

impl PusherAction {
    pub fn connect(key: impl Into<String>, options: JsonValue) -> Self {
        PusherAction::Connect {
            key: key.into(),
            options,
        }
    }

    pub fn disconnect() -> Self {
        PusherAction::Disconnect
    }

    pub fn connection_success(result: JsonValue) -> Self {
        PusherAction::ConnectionSuccess { result }
    }

    pub fn connection_error(error: JsonValue) -> Self {
        PusherAction::ConnectionError { error }
    }

    pub fn subscribe<I, S>(channel: impl Into<String>, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PusherAction::SubscribeChannel {
            channel: channel.into(),
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        PusherAction::UnsubscribeChannel {
            channel: channel.into(),
        }
    }

    pub fn message_received(channel: impl Into<String>, message: JsonValue) -> Self {
        PusherAction::MessageReceived {
            channel: channel.into(),
            message,
        }
    }

    /// Returns the tag string used on the wire.
    pub fn action_type(&self) -> &'static str {
        match self {
            PusherAction::Connect { .. } => PUSHER_CONNECT,
            PusherAction::Disconnect => PUSHER_DISCONNECT,
            PusherAction::ConnectionSuccess { .. } => PUSHER_CONNECTION_SUCCESS,
            PusherAction::ConnectionError { .. } => PUSHER_CONNECTION_ERROR,
            PusherAction::SubscribeChannel { .. } => PUSHER_SUBSCRIBE_CHANNEL,
            PusherAction::UnsubscribeChannel { .. } => PUSHER_UNSUBSCRIBE_CHANNEL,
            PusherAction::MessageReceived { .. } => PUSHER_MESSAGE_RECEIVED,
        }
    }

    /// Returns the channel carried by channel-bearing actions.
    pub fn channel(&self) -> Option<&str> {
        match self {
            PusherAction::SubscribeChannel { channel, .. }
            | PusherAction::UnsubscribeChannel { channel }
            | PusherAction::MessageReceived { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// True for actions the application dispatches to drive the client.
    pub fn is_intent(&self) -> bool {
        matches!(
            self,
            PusherAction::Connect { .. }
                | PusherAction::Disconnect
                | PusherAction::SubscribeChannel { .. }
                | PusherAction::UnsubscribeChannel { .. }
        )
    }
}
