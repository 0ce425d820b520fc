//! Action pipeline adapters.
//!
//! - `ActionStore` - Queue-backed dispatch pipeline
//! - `ActionLog` - Listener that records actions
//! - `TracingListener` - Listener that logs actions

mod action_log;
mod action_store;

pub use action_log::{ActionLog, TracingListener};
pub use action_store::ActionStore;
