//! Message handler

use std::time::Duration;

use super::{HandlerError, HandlerResult};
use crate::protocol::{MessagePayload, ServerFrame};
use crate::server::GatewayState;
use room_core::validate_message_content;
use room_service::MessageService;

/// Handles `message` frames
pub struct MessageHandler;

impl MessageHandler {
    /// Post `raw_content` as the session's user and broadcast it to everyone
    ///
    /// Checks run in order: joined, content, rate limit. A rejected message
    /// is dropped without touching the store.
    pub async fn handle(state: &GatewayState, conn_id: &str, raw_content: &str) -> HandlerResult<()> {
        let session = state.registry().get(conn_id).ok_or(HandlerError::NotJoined)?;

        validate_message_content(raw_content)
            .map_err(|e| HandlerError::send_failed(e.into()))?;

        let limiter = state.rate_limiter();
        if !limiter.check(session.user_id) {
            let retry_after_secs = ceil_secs(limiter.remaining(session.user_id));
            tracing::debug!(
                conn_id = %conn_id,
                user_id = %session.user_id,
                retry_after_secs,
                "Message rate limited"
            );
            return Err(HandlerError::RateLimited { retry_after_secs });
        }

        let message = MessageService::new(state.service_context())
            .post_user_message(session.user_id, &session.user_name, raw_content)
            .await
            .map_err(HandlerError::send_failed)?;

        let report = state.broadcaster().to_all(&ServerFrame::Message {
            message: MessagePayload::from(&message),
        });

        tracing::debug!(
            conn_id = %conn_id,
            user_id = %session.user_id,
            message_id = %message.id,
            preview = message.preview(50),
            delivered = report.delivered,
            "Message posted"
        );

        Ok(())
    }
}

/// Whole seconds, rounded up
fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
