//! Application layer - Epics and their shared state.
//!
//! This layer reacts to intents flowing through the dispatch pipeline and
//! drives the messaging client through its ports.

pub mod handlers;

pub use handlers::{
    combine_epics, ChannelMessageForwarder, ClientSlot, CombinedEpic, ConnectEpic, DisconnectEpic,
    PusherEpic, SinkConnectionEvents, SubscribeEpic, UnsubscribeEpic,
};
