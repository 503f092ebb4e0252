//! Join handler
//!
//! Brings a connection into the room under a display name.

use super::{HandlerError, HandlerResult};
use crate::connection::{ConnectionHandle, Session};
use crate::protocol::{MessagePayload, ServerFrame, UserPayload};
use crate::server::GatewayState;
use room_core::{Snowflake, User};
use room_service::{MessageService, UserService};

/// Handles `join` frames
pub struct JoinHandler;

impl JoinHandler {
    /// Join the room as `raw_name`
    ///
    /// On success the joiner has been sent `welcome` and every other session
    /// `user-joined`. On failure the connection is left unregistered.
    pub async fn handle(
        state: &GatewayState,
        conn_id: &str,
        handle: &ConnectionHandle,
        raw_name: &str,
    ) -> HandlerResult<()> {
        if state.registry().get(conn_id).is_some() {
            tracing::warn!(conn_id = %conn_id, "Client sent join while already joined");
            return Err(HandlerError::AlreadyJoined);
        }

        let user = UserService::new(state.service_context())
            .join(raw_name, conn_id)
            .await
            .map_err(HandlerError::join_failed)?;

        state.registry().add(Session::new(
            conn_id.to_string(),
            user.id,
            user.name.clone(),
            handle.clone(),
        ));

        if let Err(e) = Self::announce(state, conn_id, &user).await {
            Self::rollback(state, conn_id, user.id).await;
            return Err(e);
        }

        tracing::info!(
            conn_id = %conn_id,
            user_id = %user.id,
            name = %user.name,
            sessions = state.registry().count(),
            "User joined"
        );

        Ok(())
    }

    async fn announce(state: &GatewayState, conn_id: &str, user: &User) -> HandlerResult<()> {
        let messages = MessageService::new(state.service_context());

        let history = messages
            .history(state.config().chat.history_limit)
            .await
            .map_err(HandlerError::JoinFailed)?;
        let notice = messages
            .announce_join(user)
            .await
            .map_err(HandlerError::JoinFailed)?;

        state.broadcaster().to_one(
            conn_id,
            &ServerFrame::Welcome {
                user_id: user.id,
                history: history.iter().map(MessagePayload::from).collect(),
            },
        );
        state.broadcaster().to_others(
            conn_id,
            &ServerFrame::UserJoined {
                user: UserPayload::from(user),
                system_message: MessagePayload::from(&notice),
            },
        );

        Ok(())
    }

    /// Undo a half-finished join
    ///
    /// The user is only taken offline when no other session still holds it.
    async fn rollback(state: &GatewayState, conn_id: &str, user_id: Snowflake) {
        state.registry().remove(conn_id);
        if state.registry().get_by_user(user_id).is_some() {
            return;
        }
        if let Err(e) = UserService::new(state.service_context()).leave(user_id).await {
            tracing::warn!(
                conn_id = %conn_id,
                user_id = %user_id,
                error = %e,
                "Failed to take user offline after aborted join"
            );
        }
    }
}
