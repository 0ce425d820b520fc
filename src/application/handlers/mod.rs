//! Application handlers.
//!
//! Epics that turn dispatched intents into side effects.

pub mod pusher;

pub use pusher::{
    combine_epics, ChannelMessageForwarder, ClientSlot, CombinedEpic, ConnectEpic, DisconnectEpic,
    PusherEpic, SinkConnectionEvents, SubscribeEpic, UnsubscribeEpic,
};
