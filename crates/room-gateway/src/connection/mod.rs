//! Connection management
//!
//! Live sessions and the outbound handle of each transport connection.

mod handle;
mod registry;
mod session;

pub use handle::{ConnectionHandle, DeliveryError, OutboundReceiver};
pub use registry::ConnectionRegistry;
pub use session::{new_connection_id, Session};
