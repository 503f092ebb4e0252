//! Message entity - a chat line or a system notice

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::Snowflake;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    User,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message kind: {0}")]
pub struct MessageKindParseError(pub String);

impl FromStr for MessageKind {
    type Err = MessageKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "SYSTEM" => Ok(Self::System),
            other => Err(MessageKindParseError(other.to_string())),
        }
    }
}

/// A stored message
///
/// `user_name` is a snapshot taken when the message is written. It does not
/// follow later renames, and it survives deletion of the sender (whose id is
/// then cleared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub user_id: Option<Snowflake>,
    pub user_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A message typed by a user
    pub fn from_user(id: Snowflake, user_id: Snowflake, user_name: String, content: String) -> Self {
        Self {
            id,
            user_id: Some(user_id),
            user_name,
            content,
            kind: MessageKind::User,
            created_at: Utc::now(),
        }
    }

    /// A server-generated notice about `user_name`
    pub fn system(id: Snowflake, user_name: String, content: String) -> Self {
        Self {
            id,
            user_id: None,
            user_name,
            content,
            kind: MessageKind::System,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }

    /// Truncated content for log lines
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}
