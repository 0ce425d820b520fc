//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bridge and the outside world. Adapters implement these ports.
//!
//! ## Messaging Ports
//!
//! - `MessagingClientFactory` - Constructs the external pub/sub client
//! - `MessagingClient` - A connected client
//! - `Channel` - A channel subscription
//! - `ConnectionEvents` / `MessageHandler` - Client callbacks
//!
//! ## Dispatch Ports
//!
//! - `Epic` - Reacts to actions and may emit new ones
//! - `ActionListener` - Observes every action
//! - `ActionSink` - Feeds actions back into the pipeline
//! - `ActionRegistry` - Registration surface of a pipeline

mod action_dispatch;
mod messaging_client;

pub use action_dispatch::{ActionListener, ActionRegistry, ActionSink, Epic};
pub use messaging_client::{
    Channel, ConnectionEvents, MessageHandler, MessagingClient, MessagingClientFactory,
};
