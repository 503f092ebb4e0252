//! Outbound side of a connection
//!
//! Frames are queued on an unbounded channel and drained by the connection's
//! writer task, so a slow recipient never blocks whoever is broadcasting.

use std::sync::Arc;
use tokio::sync::mpsc;

/// Receiving end drained by the writer task
pub type OutboundReceiver = mpsc::UnboundedReceiver<Arc<str>>;

/// The frame could not be queued because the writer is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection closed")]
pub struct DeliveryError;

/// Cloneable sender for already-serialized frames
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    sender: mpsc::UnboundedSender<Arc<str>>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its writer task drains
    pub fn channel() -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue a serialized frame
    pub fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.sender.send(frame).map_err(|_| DeliveryError)
    }

    /// Whether the writer task is still draining
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}
