//! ClientSlot - The single shared messaging client handle.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::ports::MessagingClient;

/// Holds the current messaging client, if any.
///
/// Written by connect/disconnect, read by subscribe/unsubscribe. Clones share
/// the same slot.
#[derive(Clone, Default)]
pub struct ClientSlot {
    inner: Arc<RwLock<Option<Arc<dyn MessagingClient>>>>,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current client.
    pub async fn current(&self) -> Option<Arc<dyn MessagingClient>> {
        self.inner.read().await.clone()
    }

    /// Stores `client`, returning the one it replaced.
    pub async fn replace(&self, client: Arc<dyn MessagingClient>) -> Option<Arc<dyn MessagingClient>> {
        self.inner.write().await.replace(client)
    }

    /// Removes and returns the current client.
    pub async fn take(&self) -> Option<Arc<dyn MessagingClient>> {
        self.inner.write().await.take()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

impl std::fmt::Debug for ClientSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSlot").finish_non_exhaustive()
    }
}
