//! Room lifecycle services
//!
//! Long-lived service objects owned by the gateway state: the per-user
//! message rate limiter with its sweeper, and the empty-room purge.

mod monitor;
mod rate_limiter;

pub use monitor::{PurgeOutcome, RoomLifecycleMonitor};
pub use rate_limiter::{RateLimitPolicy, RateLimiter};
