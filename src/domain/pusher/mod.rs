//! Pusher module - the action vocabulary and channel naming rules.

mod action;
mod channel;
mod errors;

pub use action::{
    PusherAction, PUSHER_CONNECT, PUSHER_CONNECTION_ERROR, PUSHER_CONNECTION_SUCCESS,
    PUSHER_DISCONNECT, PUSHER_MESSAGE_RECEIVED, PUSHER_SUBSCRIBE_CHANNEL,
    PUSHER_UNSUBSCRIBE_CHANNEL,
};
pub use channel::{format_channel_name, ChannelName, MAX_CHANNEL_NAME_LEN};
pub use errors::PusherError;
