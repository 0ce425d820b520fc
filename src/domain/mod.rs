//! Domain layer containing the action vocabulary and shared types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors)
//! - `pusher` - Pusher actions, channel naming and bridge errors

pub mod foundation;
pub mod pusher;
