//! Dashboard state management.
//!
//! The refresh loop publishes one snapshot per cycle. HTTP handlers read the
//! latest one; WebSocket clients receive each new one as it is published.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::types::{DashboardMessage, DashboardSnapshot};

/// Buffered snapshot messages per WebSocket client.
const BROADCAST_CAPACITY: usize = 16;

/// Latest published snapshot plus the push channel.
#[derive(Clone)]
pub struct DashboardState {
    latest: Arc<RwLock<Option<Arc<DashboardSnapshot>>>>,
    updates: broadcast::Sender<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            latest: Arc::new(RwLock::new(None)),
            updates,
        }
    }

    /// Replace the latest snapshot and push it to WebSocket clients.
    pub fn publish(&self, snapshot: DashboardSnapshot) {
        let message = DashboardMessage::Snapshot(snapshot.clone());
        *self.latest.write() = Some(Arc::new(snapshot));

        match serde_json::to_string(&message) {
            Ok(json) => match self.updates.send(json) {
                Ok(n) => trace!(receivers = n, "Snapshot pushed"),
                Err(_) => trace!("No WebSocket receivers connected"),
            },
            Err(e) => debug!(error = %e, "Failed to serialize snapshot"),
        }
    }

    /// Most recent snapshot, if a cycle has finished yet.
    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.latest.read().clone()
    }

    /// Receive snapshots published from now on (JSON `DashboardMessage`s).
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.updates.subscribe()
    }
}
