//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bridge to external systems:
//! - `messaging` - Messaging client implementations (in-memory, Redis)
//! - `store` - The action dispatch pipeline and its listeners

pub mod messaging;
pub mod store;

pub use messaging::{InMemoryMessagingFactory, RedisMessagingFactory};
pub use store::{ActionLog, ActionStore, TracingListener};
