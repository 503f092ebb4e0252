//! Message service
//!
//! User messages, join/leave notices, history, and the purge.

use room_core::entities::{Message, User};
use room_core::{validate_message_content, Snowflake};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Validate and store a message typed by `user_id`
    ///
    /// `user_name` is stored as a snapshot. The body is stored exactly as
    /// sent; only the length check looks at the trimmed text.
    #[instrument(skip(self, user_name, raw_content))]
    pub async fn post_user_message(
        &self,
        user_id: Snowflake,
        user_name: &str,
        raw_content: &str,
    ) -> ServiceResult<Message> {
        validate_message_content(raw_content)?;
        let message = Message::from_user(
            self.ctx.generate_id(),
            user_id,
            user_name.to_string(),
            raw_content.to_string(),
        );
        self.ctx.message_repo().create(&message).await?;
        Ok(message)
    }

    /// Store the "joined" notice for `user`
    pub async fn announce_join(&self, user: &User) -> ServiceResult<Message> {
        let message = self.join_notice(&user.name);
        self.ctx.message_repo().create(&message).await?;
        Ok(message)
    }

    /// Store the "left" notice for `user_name`
    pub async fn announce_leave(&self, user_name: &str) -> ServiceResult<Message> {
        let message = self.leave_notice(user_name);
        self.ctx.message_repo().create(&message).await?;
        Ok(message)
    }

    /// Unsaved "joined" notice
    pub fn join_notice(&self, user_name: &str) -> Message {
        Message::system(
            self.ctx.generate_id(),
            user_name.to_string(),
            format!("{user_name} joined"),
        )
    }

    /// Unsaved "left" notice
    pub fn leave_notice(&self, user_name: &str) -> Message {
        Message::system(
            self.ctx.generate_id(),
            user_name.to_string(),
            format!("{user_name} left"),
        )
    }

    /// Up to `limit` most recent messages, oldest first
    #[instrument(skip(self))]
    pub async fn history(&self, limit: i64) -> ServiceResult<Vec<Message>> {
        let mut messages = self.ctx.message_repo().find_recent(limit).await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        Ok(self.ctx.message_repo().count().await?)
    }

    /// Delete every stored message
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> ServiceResult<u64> {
        let deleted = self.ctx.message_repo().delete_all().await?;
        info!(deleted, "Message history cleared");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_core::{DomainError, MessageKind, MESSAGE_MAX_CHARS};
    use room_db::MemoryStore;
    use std::sync::Arc;

    use crate::services::{ServiceContextBuilder, ServiceError, UserService};

    fn context() -> ServiceContext {
        let store = MemoryStore::new();
        ServiceContextBuilder::new()
            .user_repo(Arc::new(store.user_repo()))
            .message_repo(Arc::new(store.message_repo()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_history_is_chronological_and_limited() {
        let ctx = context();
        let messages = MessageService::new(&ctx);
        let user = UserService::new(&ctx).join("Alice", "conn-1").await.unwrap();

        for i in 0..5 {
            messages
                .post_user_message(user.id, &user.name, &format!("m{i}"))
                .await
                .unwrap();
        }

        let history = messages.history(3).await.unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_post_validates_and_keeps_raw_content() {
        let ctx = context();
        let messages = MessageService::new(&ctx);
        let id = Snowflake::new(1);

        let stored = messages.post_user_message(id, "Alice", "  hi  ").await.unwrap();
        assert_eq!(stored.content, "  hi  ");
        assert_eq!(stored.kind, MessageKind::User);
        assert_eq!(stored.user_id, Some(id));

        let too_long = "x".repeat(MESSAGE_MAX_CHARS + 1);
        let err = messages.post_user_message(id, "Alice", &too_long).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidMessage(_))));
        assert_eq!(messages.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_post_preserves_code_indentation() {
        let ctx = context();
        let messages = MessageService::new(&ctx);
        let raw = "    fn main() {}\n";

        let posted = messages
            .post_user_message(Snowflake::new(1), "Alice", raw)
            .await
            .unwrap();
        assert_eq!(posted.content, raw);

        let history = messages.history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, raw);
    }

    #[tokio::test]
    async fn test_notices() {
        let ctx = context();
        let messages = MessageService::new(&ctx);
        let user = UserService::new(&ctx).join("Bob", "conn-1").await.unwrap();

        let joined = messages.announce_join(&user).await.unwrap();
        assert!(joined.is_system());
        assert_eq!(joined.content, "Bob joined");
        assert!(joined.user_id.is_none());

        let left = messages.announce_leave("Bob").await.unwrap();
        assert_eq!(left.content, "Bob left");
        assert_eq!(messages.count().await.unwrap(), 2);

        assert_eq!(messages.leave_notice("Bob").content, "Bob left");
        assert_eq!(messages.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let ctx = context();
        let messages = MessageService::new(&ctx);
        messages.announce_leave("Bob").await.unwrap();

        assert_eq!(messages.clear_all().await.unwrap(), 1);
        assert!(messages.history(100).await.unwrap().is_empty());
    }
}
