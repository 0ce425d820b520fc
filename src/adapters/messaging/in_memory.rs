//! In-memory messaging client for testing.
//!
//! Nothing leaves the process. Tests drive the client by hand:
//! `emit_connected` / `emit_error` fire connection callbacks and `publish`
//! delivers a message to the handlers bound on a channel. Every call the
//! bridge makes is recorded for assertions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value as JsonValue;

use crate::domain::pusher::{ChannelName, PusherError};
use crate::ports::{
    Channel, ConnectionEvents, MessageHandler, MessagingClient, MessagingClientFactory,
};

/// Factory that hands out [`InMemoryMessagingClient`]s.
///
/// # Example
///
/// ```ignore
/// let factory = Arc::new(InMemoryMessagingFactory::new());
/// let epic = PusherEpic::new(factory.clone());
///
/// // ... dispatch a connect action ...
///
/// let client = factory.last_client().unwrap();
/// client.emit_connected(json!({"socket_id": "1.1"}));
/// ```
pub struct InMemoryMessagingFactory {
    clients: RwLock<Vec<Arc<InMemoryMessagingClient>>>,
    failure: Option<PusherError>,
}

impl InMemoryMessagingFactory {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            failure: None,
        }
    }

    /// A factory whose every construction attempt fails with `error`.
    pub fn failing(error: PusherError) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Every client constructed so far, oldest first.
    pub fn clients(&self) -> Vec<Arc<InMemoryMessagingClient>> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_client(&self) -> Option<Arc<InMemoryMessagingClient>> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn construction_count(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for InMemoryMessagingFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingClientFactory for InMemoryMessagingFactory {
    fn connect(
        &self,
        key: &str,
        options: &JsonValue,
        events: Arc<dyn ConnectionEvents>,
    ) -> Result<Arc<dyn MessagingClient>, PusherError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let client = Arc::new(InMemoryMessagingClient::new(key, options.clone(), events));
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(client.clone());
        Ok(client)
    }
}

/// Messaging client that keeps subscriptions in memory.
pub struct InMemoryMessagingClient {
    key: String,
    options: JsonValue,
    events: Arc<dyn ConnectionEvents>,
    channels: RwLock<HashMap<ChannelName, Arc<InMemoryChannel>>>,
    subscribe_calls: RwLock<Vec<ChannelName>>,
    disconnect_count: AtomicUsize,
}

impl InMemoryMessagingClient {
    pub fn new(key: impl Into<String>, options: JsonValue, events: Arc<dyn ConnectionEvents>) -> Self {
        Self {
            key: key.into(),
            options,
            events,
            channels: RwLock::new(HashMap::new()),
            subscribe_calls: RwLock::new(Vec::new()),
            disconnect_count: AtomicUsize::new(0),
        }
    }

    // === Test Helpers ===

    /// The options the client was constructed with.
    pub fn options(&self) -> &JsonValue {
        &self.options
    }

    /// Fires the "connected" callback.
    pub fn emit_connected(&self, result: JsonValue) {
        self.events.on_connected(result);
    }

    /// Fires the "error" callback.
    pub fn emit_error(&self, error: JsonValue) {
        self.events.on_error(error);
    }

    /// Delivers `message` to handlers bound to `event` on `channel`.
    ///
    /// `channel` is formatted the same way subscriptions are. Returns the
    /// number of handlers invoked; zero when nobody is subscribed.
    pub fn publish(&self, channel: &str, event: &str, message: JsonValue) -> usize {
        let Ok(name) = ChannelName::parse(channel) else {
            return 0;
        };
        match self.channel_entry(&name) {
            Some(subscription) => subscription.deliver(event, message),
            None => 0,
        }
    }

    /// Formatted names of channels currently subscribed.
    pub fn subscribed_channels(&self) -> Vec<ChannelName> {
        let mut names: Vec<ChannelName> = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|c| !c.is_unsubscribed())
            .map(|c| c.name.clone())
            .collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    /// Every channel name passed to `subscribe`, in call order.
    pub fn subscribe_calls(&self) -> Vec<ChannelName> {
        self.subscribe_calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The subscription for `channel`, including unsubscribed ones.
    pub fn channel_entry(&self, name: &ChannelName) -> Option<Arc<InMemoryChannel>> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnect_count.load(Ordering::SeqCst)
    }
}

impl MessagingClient for InMemoryMessagingClient {
    fn key(&self) -> &str {
        &self.key
    }

    fn subscribe(&self, channel: &ChannelName) -> Arc<dyn Channel> {
        self.subscribe_calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(channel.clone());

        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let entry = channels
            .entry(channel.clone())
            .or_insert_with(|| Arc::new(InMemoryChannel::new(channel.clone())));

        // Resubscribing after an unsubscribe starts from a clean channel
        if entry.is_unsubscribed() {
            *entry = Arc::new(InMemoryChannel::new(channel.clone()));
        }
        entry.clone()
    }

    fn channel(&self, name: &ChannelName) -> Option<Arc<dyn Channel>> {
        self.channel_entry(name)
            .filter(|c| !c.is_unsubscribed())
            .map(|c| c as Arc<dyn Channel>)
    }

    fn disconnect(&self) {
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        for channel in channels.values() {
            channel.unsubscribe();
        }
    }
}

/// A channel subscription held by [`InMemoryMessagingClient`].
pub struct InMemoryChannel {
    name: ChannelName,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn MessageHandler>>>>,
    unsubscribed: AtomicBool,
    unsubscribe_count: AtomicUsize,
}

impl InMemoryChannel {
    fn new(name: ChannelName) -> Self {
        Self {
            name,
            handlers: RwLock::new(HashMap::new()),
            unsubscribed: AtomicBool::new(false),
            unsubscribe_count: AtomicUsize::new(0),
        }
    }

    /// Invokes every handler bound to `event`. Returns how many ran.
    pub fn deliver(&self, event: &str, message: JsonValue) -> usize {
        if self.is_unsubscribed() {
            return 0;
        }

        // Clone handlers to release the lock before invoking them
        let handlers: Vec<Arc<dyn MessageHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .cloned()
            .unwrap_or_default();

        for handler in &handlers {
            handler.handle(message.clone());
        }
        handlers.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Event names with at least one handler, sorted.
    pub fn bound_events(&self) -> Vec<String> {
        let mut events: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        events.sort();
        events
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribe_count.load(Ordering::SeqCst)
    }
}

impl Channel for InMemoryChannel {
    fn name(&self) -> &ChannelName {
        &self.name
    }

    fn bind(&self, event: &str, handler: Arc<dyn MessageHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn unsubscribe(&self) {
        self.unsubscribe_count.fetch_add(1, Ordering::SeqCst);
        self.unsubscribed.store(true, Ordering::SeqCst);
    }
}
