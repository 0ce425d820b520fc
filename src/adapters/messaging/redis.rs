//! Redis-backed messaging client for production deployments.
//!
//! Maps the Pusher-style client surface onto Redis pub/sub:
//!
//! - the application key namespaces channels as `{key}:{channel}`
//! - connecting verifies the server with `PING`, then fires `on_connected`
//!   with `{"socket_id", "key"}` or `on_error` with `{"code", "message"}`
//! - every subscribed channel owns one pub/sub connection and a reader task
//! - payloads are JSON envelopes `{"event": "...", "data": ...}`; anything else
//!   is delivered to the `message` event as a JSON string
//! - the subscription outcome (`pusher:subscription_succeeded` or
//!   `pusher:subscription_error`) is kept and replayed to handlers bound later
//!
//! Reconnection is not attempted. When a reader stops, because the
//! subscription failed or its stream ended, the channel is closed and the next
//! `subscribe` for that name starts a fresh one. A stream that ends without an
//! unsubscribe also reports the loss through `on_error`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::task::JoinHandle;

use crate::config::RedisConfig;
use crate::domain::foundation::SocketId;
use crate::domain::pusher::{ChannelName, PusherError};
use crate::ports::{
    Channel, ConnectionEvents, MessageHandler, MessagingClient, MessagingClientFactory,
};

/// Event fired on a channel once its subscription is active.
pub const SUBSCRIPTION_SUCCEEDED_EVENT: &str = "pusher:subscription_succeeded";

/// Event fired on a channel when its subscription could not be established.
pub const SUBSCRIPTION_ERROR_EVENT: &str = "pusher:subscription_error";

/// Event that receives payloads which are not JSON envelopes.
pub const RAW_MESSAGE_EVENT: &str = "message";

/// Per-connect overrides accepted in the connect action's `options`.
///
/// Unknown fields are ignored so Pusher-style options (`cluster`, ...) can be
/// passed unchanged.
#[derive(Debug, Default, Deserialize)]
struct RedisConnectOptions {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Constructs [`RedisMessagingClient`]s.
pub struct RedisMessagingFactory {
    defaults: RedisConfig,
}

impl RedisMessagingFactory {
    /// Create a factory whose clients default to `defaults`.
    pub fn new(defaults: RedisConfig) -> Self {
        Self { defaults }
    }
}

impl MessagingClientFactory for RedisMessagingFactory {
    fn connect(
        &self,
        key: &str,
        options: &JsonValue,
        events: Arc<dyn ConnectionEvents>,
    ) -> Result<Arc<dyn MessagingClient>, PusherError> {
        let overrides: RedisConnectOptions = if options.is_null() {
            RedisConnectOptions::default()
        } else {
            serde_json::from_value(options.clone())
                .map_err(|e| PusherError::connection(format!("invalid connect options: {}", e)))?
        };

        let url = overrides.url.unwrap_or_else(|| self.defaults.url.clone());
        let timeout = overrides
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.defaults.timeout());

        let client = redis::Client::open(url.as_str())?;
        let messaging = Arc::new(RedisMessagingClient::new(key, client, timeout, events));
        messaging.spawn_connection_check();

        tracing::debug!(key = %key, socket_id = %messaging.socket_id, "Redis messaging client constructed");
        Ok(messaging)
    }
}

/// Messaging client over Redis pub/sub.
pub struct RedisMessagingClient {
    key: String,
    socket_id: SocketId,
    client: redis::Client,
    timeout: Duration,
    events: Arc<dyn ConnectionEvents>,
    channels: RwLock<HashMap<ChannelName, Arc<RedisChannel>>>,
    connection_check: Mutex<Option<JoinHandle<()>>>,
}

impl RedisMessagingClient {
    fn new(
        key: &str,
        client: redis::Client,
        timeout: Duration,
        events: Arc<dyn ConnectionEvents>,
    ) -> Self {
        Self {
            key: key.to_string(),
            socket_id: SocketId::new(),
            client,
            timeout,
            events,
            channels: RwLock::new(HashMap::new()),
            connection_check: Mutex::new(None),
        }
    }

    fn spawn_connection_check(&self) {
        let client = self.client.clone();
        let events = self.events.clone();
        let timeout = self.timeout;
        let connected = json!({
            "socket_id": self.socket_id.to_string(),
            "key": self.key,
        });

        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, ping(&client)).await {
                Ok(Ok(())) => events.on_connected(connected),
                Ok(Err(e)) => events.on_error(PusherError::from(e).to_payload()),
                Err(_) => events.on_error(
                    PusherError::connection(format!("no answer within {:?}", timeout)).to_payload(),
                ),
            }
        });

        *self
            .connection_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }
}

/// Redis channel name for `channel` under `key`.
pub fn namespaced_channel(key: &str, channel: &ChannelName) -> String {
    if key.is_empty() {
        channel.to_string()
    } else {
        format!("{}:{}", key, channel)
    }
}

impl MessagingClient for RedisMessagingClient {
    fn key(&self) -> &str {
        &self.key
    }

    fn subscribe(&self, channel: &ChannelName) -> Arc<dyn Channel> {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = channels.get(channel).filter(|c| !c.is_closed()) {
            return existing.clone();
        }

        let subscription = Arc::new(RedisChannel::new(
            channel.clone(),
            namespaced_channel(&self.key, channel),
        ));
        subscription.spawn_reader(self.client.clone(), self.events.clone());
        channels.insert(channel.clone(), subscription.clone());

        tracing::debug!(channel = %channel, redis_channel = %subscription.redis_channel, "Subscribing");
        subscription
    }

    fn channel(&self, name: &ChannelName) -> Option<Arc<dyn Channel>> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .filter(|c| !c.is_closed())
            .map(|c| c.clone() as Arc<dyn Channel>)
    }

    fn disconnect(&self) {
        if let Some(check) = self
            .connection_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            check.abort();
        }

        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        for (_, channel) in channels.drain() {
            channel.unsubscribe();
        }

        tracing::info!(key = %self.key, socket_id = %self.socket_id, "Redis messaging client disconnected");
    }
}

/// A channel subscription backed by its own pub/sub connection.
pub struct RedisChannel {
    shared: Arc<ChannelShared>,
    redis_channel: String,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl RedisChannel {
    fn new(name: ChannelName, redis_channel: String) -> Self {
        Self {
            shared: Arc::new(ChannelShared::new(name)),
            redis_channel,
            reader: Mutex::new(None),
        }
    }

    fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    fn spawn_reader(&self, client: redis::Client, events: Arc<dyn ConnectionEvents>) {
        let shared = self.shared.clone();
        let redis_channel = self.redis_channel.clone();

        let handle = tokio::spawn(async move {
            match open_subscription(&client, &redis_channel).await {
                Ok(pubsub) => {
                    shared.record_status(
                        SUBSCRIPTION_SUCCEEDED_EVENT,
                        json!({ "channel": shared.name.as_str() }),
                    );
                    let messages = pubsub
                        .into_on_message()
                        .map(|msg| msg.get_payload_bytes().to_vec());
                    shared.forward(messages, events.as_ref()).await;
                }
                Err(e) => {
                    tracing::warn!(channel = %shared.name, error = %e, "Subscription failed");
                    shared.fail(PusherError::from(e));
                }
            }
        });

        *self.reader.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }
}

impl Channel for RedisChannel {
    fn name(&self) -> &ChannelName {
        &self.shared.name
    }

    fn bind(&self, event: &str, handler: Arc<dyn MessageHandler>) {
        self.shared.bind(event, handler);
    }

    fn unsubscribe(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.lock().unwrap_or_else(PoisonError::into_inner).take() {
            reader.abort();
        }
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .clear();
        tracing::debug!(channel = %self.shared.name, "Unsubscribed");
    }
}

#[derive(Default)]
struct ChannelState {
    handlers: HashMap<String, Vec<Arc<dyn MessageHandler>>>,
    /// Subscription outcome, replayed to handlers bound after it fired.
    status: Option<(&'static str, JsonValue)>,
}

/// State shared between a [`RedisChannel`] and its reader task.
struct ChannelShared {
    name: ChannelName,
    state: RwLock<ChannelState>,
    closed: AtomicBool,
}

impl ChannelShared {
    fn new(name: ChannelName) -> Self {
        Self {
            name,
            state: RwLock::new(ChannelState::default()),
            closed: AtomicBool::new(false),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn bind(&self, event: &str, handler: Arc<dyn MessageHandler>) {
        let replay = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state
                .handlers
                .entry(event.to_string())
                .or_default()
                .push(handler.clone());
            state
                .status
                .as_ref()
                .filter(|(status_event, _)| *status_event == event)
                .map(|(_, payload)| payload.clone())
        };

        if let Some(payload) = replay {
            handler.handle(payload);
        }
    }

    /// Stores the subscription outcome and delivers it to current handlers.
    fn record_status(&self, event: &'static str, payload: JsonValue) {
        let bound = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.status = Some((event, payload.clone()));
            state.handlers.get(event).cloned().unwrap_or_default()
        };
        for handler in bound {
            handler.handle(payload.clone());
        }
    }

    /// Closes the channel because its subscription could not be established.
    fn fail(&self, error: PusherError) {
        self.closed.store(true, Ordering::SeqCst);
        self.record_status(SUBSCRIPTION_ERROR_EVENT, error.to_payload());
    }

    fn deliver(&self, event: &str, message: JsonValue) {
        // Clone handlers to release the lock before invoking them
        let bound: Vec<Arc<dyn MessageHandler>> = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .get(event)
            .cloned()
            .unwrap_or_default();

        for handler in bound {
            tracing::trace!(event = %event, handler = handler.name(), "Delivering message");
            handler.handle(message.clone());
        }
    }

    /// Routes raw payloads to handlers until `messages` ends, then closes the
    /// channel. An end not caused by `unsubscribe` is reported via `on_error`.
    async fn forward<S>(&self, messages: S, events: &dyn ConnectionEvents)
    where
        S: Stream<Item = Vec<u8>>,
    {
        let mut messages = std::pin::pin!(messages);
        while let Some(raw) = messages.next().await {
            let (event, data) = decode_payload(&raw);
            self.deliver(&event, data);
        }

        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::warn!(channel = %self.name, "Subscription stream ended");
            events.on_error(
                PusherError::connection(format!("subscription to '{}' was closed", self.name))
                    .to_payload(),
            );
        }
    }
}

async fn ping(client: &redis::Client) -> redis::RedisResult<()> {
    let mut conn = client.get_multiplexed_tokio_connection().await?;
    redis::cmd("PING").query_async::<_, ()>(&mut conn).await
}

async fn open_subscription(
    client: &redis::Client,
    redis_channel: &str,
) -> redis::RedisResult<redis::aio::PubSub> {
    let mut pubsub = client.get_async_connection().await?.into_pubsub();
    pubsub.subscribe(redis_channel).await?;
    Ok(pubsub)
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: JsonValue,
}

/// Splits a raw pub/sub payload into event name and message.
pub fn decode_payload(raw: &[u8]) -> (String, JsonValue) {
    match serde_json::from_slice::<Envelope>(raw) {
        Ok(envelope) => (envelope.event, envelope.data),
        Err(_) => (
            RAW_MESSAGE_EVENT.to_string(),
            JsonValue::String(String::from_utf8_lossy(raw).into_owned()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct ChannelEvents(mpsc::UnboundedSender<Result<JsonValue, JsonValue>>);

    impl ConnectionEvents for ChannelEvents {
        fn on_connected(&self, result: JsonValue) {
            let _ = self.0.send(Ok(result));
        }

        fn on_error(&self, error: JsonValue) {
            let _ = self.0.send(Err(error));
        }
    }

    #[derive(Default)]
    struct RecordingHandler(Mutex<Vec<JsonValue>>);

    impl MessageHandler for RecordingHandler {
        fn handle(&self, message: JsonValue) {
            self.0.lock().unwrap().push(message);
        }

        fn name(&self) -> &'static str {
            "RecordingHandler"
        }
    }

    /// Hands messages to a test over a channel so it can await them.
    struct NotifyingHandler(mpsc::UnboundedSender<JsonValue>);

    impl MessageHandler for NotifyingHandler {
        fn handle(&self, message: JsonValue) {
            let _ = self.0.send(message);
        }

        fn name(&self) -> &'static str {
            "NotifyingHandler"
        }
    }

    fn factory(url: &str) -> RedisMessagingFactory {
        RedisMessagingFactory::new(RedisConfig {
            url: url.to_string(),
            timeout_secs: 2,
        })
    }

    fn unreachable_client() -> Arc<dyn MessagingClient> {
        let (tx, _rx) = mpsc::unbounded_channel();
        factory("redis://127.0.0.1:1")
            .connect("k", &JsonValue::Null, Arc::new(ChannelEvents(tx)))
            .unwrap()
    }

    fn orders() -> ChannelName {
        ChannelName::parse("orders").unwrap()
    }

    #[test]
    fn decodes_json_envelope() {
        let (event, data) = decode_payload(br#"{"event":"created","data":{"id":7}}"#);
        assert_eq!(event, "created");
        assert_eq!(data, json!({"id": 7}));
    }

    #[test]
    fn envelope_without_data_yields_null() {
        let (event, data) = decode_payload(br#"{"event":"ping"}"#);
        assert_eq!(event, "ping");
        assert_eq!(data, JsonValue::Null);
    }

    #[test]
    fn non_envelope_payload_goes_to_message_event() {
        let (event, data) = decode_payload(b"plain text");
        assert_eq!(event, RAW_MESSAGE_EVENT);
        assert_eq!(data, json!("plain text"));

        let (event, _) = decode_payload(br#"{"id": 1}"#);
        assert_eq!(event, RAW_MESSAGE_EVENT);
    }

    #[test]
    fn channels_are_namespaced_by_key() {
        assert_eq!(namespaced_channel("app", &orders()), "app:orders");
        assert_eq!(namespaced_channel("", &orders()), "orders");
    }

    #[test]
    fn deliver_reaches_handlers_for_event_only() {
        let shared = ChannelShared::new(orders());
        let handler = Arc::new(RecordingHandler::default());
        shared.bind("created", handler.clone());

        shared.deliver("created", json!(1));
        shared.deliver("deleted", json!(2));

        assert_eq!(*handler.0.lock().unwrap(), vec![json!(1)]);
    }

    #[test]
    fn subscription_status_is_replayed_to_late_handlers() {
        let shared = ChannelShared::new(orders());
        let early = Arc::new(RecordingHandler::default());
        shared.bind(SUBSCRIPTION_SUCCEEDED_EVENT, early.clone());

        shared.record_status(SUBSCRIPTION_SUCCEEDED_EVENT, json!({"channel": "orders"}));

        let late = Arc::new(RecordingHandler::default());
        let unrelated = Arc::new(RecordingHandler::default());
        shared.bind(SUBSCRIPTION_SUCCEEDED_EVENT, late.clone());
        shared.bind(SUBSCRIPTION_ERROR_EVENT, unrelated.clone());

        assert_eq!(*early.0.lock().unwrap(), vec![json!({"channel": "orders"})]);
        assert_eq!(*late.0.lock().unwrap(), vec![json!({"channel": "orders"})]);
        assert!(unrelated.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ended_stream_closes_channel_and_reports_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = ChannelShared::new(orders());
        let handler = Arc::new(RecordingHandler::default());
        shared.bind("created", handler.clone());

        let payloads = vec![br#"{"event":"created","data":1}"#.to_vec()];
        shared
            .forward(futures::stream::iter(payloads), &ChannelEvents(tx))
            .await;

        assert_eq!(*handler.0.lock().unwrap(), vec![json!(1)]);
        assert!(shared.is_closed());
        let error = rx.try_recv().unwrap().unwrap_err();
        assert_eq!(error["code"], "CONNECTION_FAILED");
    }

    #[tokio::test]
    async fn ended_stream_after_unsubscribe_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = ChannelShared::new(orders());
        shared.closed.store(true, Ordering::SeqCst);

        shared
            .forward(futures::stream::iter(Vec::<Vec<u8>>::new()), &ChannelEvents(tx))
            .await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_url_fails_construction() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = factory("not a url").connect("k", &JsonValue::Null, Arc::new(ChannelEvents(tx)));

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn malformed_options_fail_construction() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = factory("redis://127.0.0.1:6379").connect(
            "k",
            &json!({"url": 42}),
            Arc::new(ChannelEvents(tx)),
        );

        assert!(matches!(result, Err(PusherError::Connection(_))));
    }

    #[tokio::test]
    async fn unreachable_server_reports_error_callback() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = factory("redis://127.0.0.1:1")
            .connect("k", &json!({"timeout_secs": 1}), Arc::new(ChannelEvents(tx)))
            .unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no connection callback")
            .unwrap();

        assert!(outcome.is_err());
        assert_eq!(client.key(), "k");
        client.disconnect();
    }

    #[tokio::test]
    async fn unsubscribe_closes_channel() {
        let client = unreachable_client();

        let channel = client.subscribe(&orders());
        channel.bind("created", Arc::new(RecordingHandler::default()));
        channel.unsubscribe();

        assert!(client.channel(&orders()).is_none());
        client.disconnect();
    }

    #[tokio::test]
    async fn failed_subscription_closes_channel_and_resubscribe_starts_fresh() {
        let client = unreachable_client();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = client.subscribe(&orders());
        first.bind(SUBSCRIPTION_ERROR_EVENT, Arc::new(NotifyingHandler(tx)));

        let error = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no subscription error")
            .unwrap();
        assert!(error["code"].is_string());
        assert!(client.channel(&orders()).is_none());

        let second = client.subscribe(&orders());
        assert!(!Arc::ptr_eq(&first, &second));
        client.disconnect();
    }
}
