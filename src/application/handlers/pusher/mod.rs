//! Pusher epics - Map pusher intents onto messaging client calls.
//!
//! - `ConnectEpic` - Constructs the client and wires connection callbacks
//! - `DisconnectEpic` - Closes the client
//! - `SubscribeEpic` - Subscribes channels and forwards messages
//! - `UnsubscribeEpic` - Leaves channels
//! - `PusherEpic` - All four sharing one `ClientSlot`

mod client_slot;
mod connect;
mod disconnect;
mod pusher_epic;
mod subscribe;
mod unsubscribe;

pub use client_slot::ClientSlot;
pub use connect::{ConnectEpic, SinkConnectionEvents};
pub use disconnect::DisconnectEpic;
pub use pusher_epic::{combine_epics, CombinedEpic, PusherEpic};
pub use subscribe::{ChannelMessageForwarder, SubscribeEpic};
pub use unsubscribe::UnsubscribeEpic;
