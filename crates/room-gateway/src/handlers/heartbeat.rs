//! Heartbeat handler

use crate::server::GatewayState;
use room_service::UserService;

/// Handles `heartbeat` frames
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Record activity for the joined user; nothing is sent back
    pub async fn handle(state: &GatewayState, conn_id: &str) {
        let Some(session) = state.registry().get(conn_id) else {
            tracing::trace!(conn_id = %conn_id, "Heartbeat before join ignored");
            return;
        };

        if let Err(e) = UserService::new(state.service_context())
            .touch(session.user_id)
            .await
        {
            tracing::warn!(
                conn_id = %conn_id,
                user_id = %session.user_id,
                error = %e,
                "Failed to record heartbeat"
            );
            return;
        }

        tracing::trace!(conn_id = %conn_id, user_id = %session.user_id, "Heartbeat received");
    }
}
