//! Frame handlers
//!
//! [`ProtocolHandler`] owns one connection's protocol state and routes each
//! decoded client frame to its handler. Failures become `error` frames for
//! the sender; the connection stays open.

mod disconnect;
mod error;
mod heartbeat;
mod join;
mod message;

pub use disconnect::DisconnectHandler;
pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use join::JoinHandler;
pub use message::MessageHandler;

use std::sync::Arc;

use crate::connection::{new_connection_id, ConnectionHandle};
use crate::protocol::ClientFrame;
use crate::server::GatewayState;

/// Where a connection is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Transport open, not joined yet
    Connecting,
    Joined,
    /// Terminal
    Closed,
}

/// Per-connection protocol state machine
///
/// Frames from one connection are handled sequentially: the caller awaits
/// each `handle_*` before reading the next frame.
pub struct ProtocolHandler {
    state: GatewayState,
    conn_id: String,
    handle: ConnectionHandle,
    phase: ConnectionPhase,
}

impl ProtocolHandler {
    /// Handler for a fresh connection with a generated id
    pub fn new(state: GatewayState, handle: ConnectionHandle) -> Self {
        Self::with_connection_id(state, new_connection_id(), handle)
    }

    pub fn with_connection_id(state: GatewayState, conn_id: String, handle: ConnectionHandle) -> Self {
        Self {
            state,
            conn_id,
            handle,
            phase: ConnectionPhase::Connecting,
        }
    }

    pub fn conn_id(&self) -> &str {
        &self.conn_id
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// Decode and handle a text frame
    pub async fn handle_text(&mut self, text: &str) {
        match ClientFrame::from_json(text) {
            Ok(frame) => self.handle_frame(frame).await,
            Err(e) => self.reject(&HandlerError::InvalidFrame(e.to_string())),
        }
    }

    /// Binary frames are not part of the protocol
    pub fn handle_binary(&mut self, len: usize) {
        self.reject(&HandlerError::InvalidFrame(format!(
            "binary frame of {len} bytes"
        )));
    }

    pub async fn handle_frame(&mut self, frame: ClientFrame) {
        if self.phase == ConnectionPhase::Closed {
            return;
        }

        let result = match frame {
            ClientFrame::Join { name } => {
                JoinHandler::handle(&self.state, &self.conn_id, &self.handle, &name).await
            }
            ClientFrame::Message { content } => {
                MessageHandler::handle(&self.state, &self.conn_id, &content).await
            }
            ClientFrame::Heartbeat => {
                HeartbeatHandler::handle(&self.state, &self.conn_id).await;
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                if self.phase == ConnectionPhase::Connecting
                    && self.state.registry().get(&self.conn_id).is_some()
                {
                    self.phase = ConnectionPhase::Joined;
                }
            }
            Err(e) => self.reject(&e),
        }
    }

    /// Run the departure flow; later calls are no-ops
    pub async fn disconnect(&mut self) {
        if self.phase == ConnectionPhase::Closed {
            return;
        }
        self.phase = ConnectionPhase::Closed;
        DisconnectHandler::handle(&self.state, &self.conn_id).await;
    }

    fn reject(&self, err: &HandlerError) {
        if err.is_internal() {
            tracing::error!(conn_id = %self.conn_id, error = %err, "Frame handling failed");
        } else {
            tracing::debug!(conn_id = %self.conn_id, error = %err, "Frame rejected");
        }

        let frame = err.to_frame();
        match frame.to_json() {
            Ok(json) => {
                if self.handle.deliver(Arc::from(json)).is_err() {
                    tracing::debug!(conn_id = %self.conn_id, "Error frame dropped, connection closed");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize error frame"),
        }
    }
}

impl std::fmt::Debug for ProtocolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandler")
            .field("conn_id", &self.conn_id)
            .field("phase", &self.phase)
            .finish()
    }
}
