//! Messaging client adapters.
//!
//! Adapters implement the messaging client ports for different
//! environments:
//!
//! - `InMemoryMessagingFactory` - Deterministic, in-process client for testing
//! - `RedisMessagingFactory` - Redis pub/sub client for production

mod in_memory;
mod redis;

pub use self::in_memory::{InMemoryChannel, InMemoryMessagingClient, InMemoryMessagingFactory};
pub use self::redis::{
    decode_payload, namespaced_channel, RedisChannel, RedisMessagingClient, RedisMessagingFactory,
    RAW_MESSAGE_EVENT, SUBSCRIPTION_ERROR_EVENT, SUBSCRIPTION_SUCCEEDED_EVENT,
};
