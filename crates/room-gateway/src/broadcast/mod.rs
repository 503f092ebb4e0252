//! Frame fan-out
//!
//! Delivers server frames to sessions resolved through the connection registry.

mod broadcaster;

pub use broadcaster::{Broadcaster, DeliveryReport};
