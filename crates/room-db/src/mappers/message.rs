//! Message entity <-> model mapper

use room_core::entities::{Message, MessageKind};
use room_core::error::DomainError;
use room_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
///
/// Fails only if the row carries a kind the CHECK constraint should have rejected.
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let kind: MessageKind = model
            .kind
            .parse()
            .map_err(|e| DomainError::DatabaseError(format!("message {}: {e}", model.id)))?;

        Ok(Message {
            id: Snowflake::new(model.id),
            user_id: model.user_id.map(Snowflake::new),
            user_name: model.user_name,
            content: model.content,
            kind,
            created_at: model.created_at,
        })
    }
}

/// Convert Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: &'a str,
    pub content: &'a str,
    pub kind: &'static str,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            user_id: message.user_id.map(Snowflake::into_inner),
            user_name: &message.user_name,
            content: &message.content,
            kind: message.kind.as_str(),
        }
    }
}
