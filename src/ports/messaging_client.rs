//! MessagingClient port - Interface for the external real-time messaging client.
//!
//! The bridge never speaks a pub/sub protocol itself. Everything protocol
//! related (wire format, heartbeats, reconnection) belongs to the client behind
//! these traits. The shapes mirror the usual Pusher-style SDK surface:
//!
//! ```text
//! factory.connect(key, options, events)  ──▶  client
//! client.subscribe(channel)              ──▶  channel
//! channel.bind(event, handler)
//! channel.unsubscribe()
//! client.disconnect()
//! ```
//!
//! Callbacks (`ConnectionEvents`, `MessageHandler`) may be invoked from any
//! task and must not block.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::pusher::{ChannelName, PusherError};

/// Receives connection lifecycle callbacks from a client.
pub trait ConnectionEvents: Send + Sync {
    /// The client reported its connection as established.
    fn on_connected(&self, result: JsonValue);

    /// The client reported a connection failure.
    ///
    /// `error` is whatever the client surfaces; it is forwarded untouched.
    fn on_error(&self, error: JsonValue);
}

/// Handler bound to one event name on one channel.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: JsonValue);

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// A subscription to a single channel.
pub trait Channel: Send + Sync {
    /// The formatted name the channel was subscribed under.
    fn name(&self) -> &ChannelName;

    /// Registers `handler` for messages published with `event`.
    ///
    /// Binding the same event more than once registers every handler.
    fn bind(&self, event: &str, handler: Arc<dyn MessageHandler>);

    /// Leaves the channel. Bound handlers receive nothing afterwards.
    fn unsubscribe(&self);
}

/// A constructed messaging client.
pub trait MessagingClient: Send + Sync {
    /// The application key the client was constructed with.
    fn key(&self) -> &str;

    /// Subscribes to `channel`, returning the existing subscription when the
    /// channel is already subscribed.
    fn subscribe(&self, channel: &ChannelName) -> Arc<dyn Channel>;

    /// Looks up an active subscription.
    fn channel(&self, name: &ChannelName) -> Option<Arc<dyn Channel>>;

    /// Closes the connection and every subscription.
    fn disconnect(&self);
}

/// Constructs messaging clients.
///
/// # Example
///
/// ```ignore
/// let client = factory.connect("app-key", &json!({"cluster": "eu"}), events)?;
/// let channel = client.subscribe(&ChannelName::parse("orders")?);
/// channel.bind("created", handler);
/// ```
pub trait MessagingClientFactory: Send + Sync {
    /// Constructs a client. Connection progress is reported to `events`.
    ///
    /// Returns an error only when the client cannot be constructed at all,
    /// e.g. because `options` are malformed.
    fn connect(
        &self,
        key: &str,
        options: &JsonValue,
        events: Arc<dyn ConnectionEvents>,
    ) -> Result<Arc<dyn MessagingClient>, PusherError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_client_object_safe(_: &dyn MessagingClient) {}

    #[allow(dead_code)]
    fn assert_channel_object_safe(_: &dyn Channel) {}

    #[allow(dead_code)]
    fn assert_factory_object_safe(_: &dyn MessagingClientFactory) {}

    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync + ?Sized>() {}

    #[test]
    fn messaging_traits_are_send_sync() {
        assert_send_sync::<dyn MessagingClient>();
        assert_send_sync::<dyn Channel>();
        assert_send_sync::<dyn ConnectionEvents>();
        assert_send_sync::<dyn MessageHandler>();
    }
}
