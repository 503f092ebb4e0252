//! Disconnect handler
//!
//! Runs once per transport close. Nothing here fails the caller: store
//! errors are logged and the departure is still announced.

use crate::protocol::{MessagePayload, ServerFrame};
use crate::server::GatewayState;
use room_service::{MessageService, UserService};

/// Handles a closed connection
pub struct DisconnectHandler;

impl DisconnectHandler {
    pub async fn handle(state: &GatewayState, conn_id: &str) {
        let Some(session) = state.registry().remove(conn_id) else {
            tracing::debug!(conn_id = %conn_id, "Connection closed before join");
            return;
        };
        let ctx = state.service_context();

        if let Err(e) = UserService::new(ctx).leave(session.user_id).await {
            tracing::error!(
                conn_id = %conn_id,
                user_id = %session.user_id,
                error = %e,
                "Failed to mark user offline"
            );
        }

        let messages = MessageService::new(ctx);
        let notice = match messages.announce_leave(&session.user_name).await {
            Ok(notice) => notice,
            Err(e) => {
                tracing::warn!(
                    conn_id = %conn_id,
                    user_id = %session.user_id,
                    error = %e,
                    "Failed to store leave notice, broadcasting unsaved"
                );
                messages.leave_notice(&session.user_name)
            }
        };

        state.broadcaster().to_all(&ServerFrame::UserLeft {
            user_id: session.user_id,
            system_message: MessagePayload::from(&notice),
        });

        tracing::info!(
            conn_id = %conn_id,
            user_id = %session.user_id,
            name = %session.user_name,
            sessions = state.registry().count(),
            "User left"
        );

        // detached; may race with a join arriving right now
        drop(state.monitor().spawn_check());
    }
}
