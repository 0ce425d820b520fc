//! Pusher Bridge - Connects a pub/sub messaging client to an action pipeline.
//!
//! Intents (`@@pusher/CONNECT`, `@@pusher/SUBSCRIBE_CHANNEL`, ...) are
//! dispatched into an `ActionStore`. The `PusherEpic` turns them into
//! messaging client calls and feeds connection outcomes and received
//! messages back into the pipeline as event actions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
