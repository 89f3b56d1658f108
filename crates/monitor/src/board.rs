//! Published door table.
//!
//! The [`DoorBoard`] is the only state shared between the monitor and the
//! HTTP surface. The monitor is its sole writer: `publish` is crate-private
//! and takes the write lock only long enough to update one door. Readers get
//! an owned snapshot cloned under the read lock, so a status response never
//! mixes levels from before and after a single update.

use std::sync::Arc;

use doorwatch_core::config::HomeConfig;
use doorwatch_core::door::DoorStatus;
use doorwatch_core::types::Timestamp;
use tokio::sync::RwLock;

/// Cheaply cloneable handle to the published door table.
#[derive(Debug, Clone, Default)]
pub struct DoorBoard {
    doors: Arc<RwLock<Vec<DoorStatus>>>,
}

impl DoorBoard {
    pub fn new(doors: Vec<DoorStatus>) -> Self {
        Self {
            doors: Arc::new(RwLock::new(doors)),
        }
    }

    /// Seed the table from the door configuration, in configured order.
    pub fn from_config(config: &HomeConfig) -> Self {
        Self::new(
            config
                .doors
                .iter()
                .map(|door| DoorStatus {
                    door: door.door.clone(),
                    open: door.open,
                    gpio_pin: door.gpio_pin,
                    last_changed_at: None,
                })
                .collect(),
        )
    }

    /// Consistent copy of every door.
    pub async fn snapshot(&self) -> Vec<DoorStatus> {
        self.doors.read().await.clone()
    }

    /// Current status of the door named `door`, if it is monitored.
    pub async fn get(&self, door: &str) -> Option<DoorStatus> {
        self.doors
            .read()
            .await
            .iter()
            .find(|status| status.door == door)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.doors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.doors.read().await.is_empty()
    }

    /// Record a newly observed level for the door at `index`.
    pub(crate) async fn publish(&self, index: usize, open: bool, at: Timestamp) {
        if let Some(status) = self.doors.write().await.get_mut(index) {
            status.open = open;
            status.last_changed_at = Some(at);
        }
    }
}
