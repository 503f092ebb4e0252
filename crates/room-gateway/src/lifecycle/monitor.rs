//! Empty-room detector
//!
//! After a departure the monitor asks the store how many users are online
//! and wipes the message history once nobody is left. The check runs as a
//! detached task; a join landing between the count and the delete can lose
//! history it would otherwise have seen.

use std::sync::Arc;

use room_service::{MessageService, ServiceContext, UserService};
use tokio::task::JoinHandle;

/// What a room check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Users still online; nothing deleted
    Occupied { online: i64 },
    /// Room was empty; history deleted
    Purged { deleted: u64 },
    /// A store call failed; already logged
    Failed,
}

/// Purges history once the room empties
#[derive(Debug, Clone)]
pub struct RoomLifecycleMonitor {
    ctx: Arc<ServiceContext>,
}

impl RoomLifecycleMonitor {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Delete all messages iff no user is online
    ///
    /// Never returns an error; failures are logged and reported as [`PurgeOutcome::Failed`].
    pub async fn check_and_purge_if_empty(&self) -> PurgeOutcome {
        let online = match UserService::new(&self.ctx).count_online().await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "Room check failed to count online users");
                return PurgeOutcome::Failed;
            }
        };

        if online > 0 {
            tracing::debug!(online, "Room still occupied");
            return PurgeOutcome::Occupied { online };
        }

        match MessageService::new(&self.ctx).clear_all().await {
            Ok(deleted) => {
                tracing::info!(deleted, "Room empty, message history purged");
                PurgeOutcome::Purged { deleted }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to purge message history");
                PurgeOutcome::Failed
            }
        }
    }

    /// Run [`Self::check_and_purge_if_empty`] on a detached task
    pub fn spawn_check(&self) -> JoinHandle<PurgeOutcome> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.check_and_purge_if_empty().await })
    }
}
