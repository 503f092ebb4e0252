//! Client and server frame definitions

use chrono::{DateTime, Utc};
use room_core::{Message, MessageKind, Snowflake, User};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    Join { name: String },
    Message { content: String },
    Heartbeat,
}

impl ClientFrame {
    /// Parse a client frame from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Frames the server sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// Sent to the joiner only
    Welcome {
        user_id: Snowflake,
        history: Vec<MessagePayload>,
    },
    Message {
        message: MessagePayload,
    },
    UserJoined {
        user: UserPayload,
        system_message: MessagePayload,
    },
    UserLeft {
        user_id: Snowflake,
        system_message: MessagePayload,
    },
    /// Part of the protocol; no flow emits it today
    ActiveUsers {
        users: Vec<UserPayload>,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerFrame {
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The `type` discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::Message { .. } => "message",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::ActiveUsers { .. } => "active-users",
            Self::Error { .. } => "error",
        }
    }
}

/// A message as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: Snowflake,
    pub user_id: Option<Snowflake>,
    pub user_name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessagePayload {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            user_id: message.user_id,
            user_name: message.user_name.clone(),
            content: message.content.clone(),
            kind: message.kind,
            created_at: message.created_at,
        }
    }
}

/// A user as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Snowflake,
    pub name: String,
    pub is_online: bool,
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            is_online: user.is_online,
        }
    }
}

/// Error codes carried by `error` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidName,
    InvalidMessage,
    NotJoined,
    RateLimit,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidMessage => "INVALID_MESSAGE",
            Self::NotJoined => "NOT_JOINED",
            Self::RateLimit => "RATE_LIMIT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_parse_client_frames() {
        assert_eq!(
            ClientFrame::from_json(r#"{"type":"join","name":"Alice"}"#).unwrap(),
            ClientFrame::Join {
                name: "Alice".into()
            }
        );
        assert_eq!(
            ClientFrame::from_json(r#"{"type":"message","content":"hi"}"#).unwrap(),
            ClientFrame::Message {
                content: "hi".into()
            }
        );
        assert_eq!(
            ClientFrame::from_json(r#"{"type":"heartbeat"}"#).unwrap(),
            ClientFrame::Heartbeat
        );
    }

    #[test]
    fn test_reject_malformed_client_frames() {
        for raw in [
            "not json",
            r#"{"type":"typing"}"#,
            r#"{"type":"join"}"#,
            r#"{"name":"Alice"}"#,
            r#"{"type":"message","content":42}"#,
        ] {
            assert!(ClientFrame::from_json(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_message_payload_shape() {
        let message = Message::system(Snowflake::new(42), "Alice".into(), "Alice joined".into());
        let value = serde_json::to_value(MessagePayload::from(&message)).unwrap();

        assert_eq!(value["id"], json!("42"));
        assert_eq!(value["userId"], Value::Null);
        assert_eq!(value["userName"], json!("Alice"));
        assert_eq!(value["type"], json!("SYSTEM"));
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_server_frame_tags_and_field_case() {
        let user = User::new_online(Snowflake::new(7), "Bob".into(), "conn".into());
        let notice = Message::system(Snowflake::new(8), "Bob".into(), "Bob joined".into());
        let frame = ServerFrame::UserJoined {
            user: UserPayload::from(&user),
            system_message: MessagePayload::from(&notice),
        };

        let value: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], json!("user-joined"));
        assert_eq!(value["user"], json!({"id": "7", "name": "Bob", "isOnline": true}));
        assert_eq!(value["systemMessage"]["content"], json!("Bob joined"));
        assert_eq!(frame.kind(), "user-joined");

        let welcome = ServerFrame::Welcome {
            user_id: Snowflake::new(7),
            history: Vec::new(),
        };
        let value = serde_json::to_value(&welcome).unwrap();
        assert_eq!(value, json!({"type": "welcome", "userId": "7", "history": []}));
    }

    #[test]
    fn test_error_frame() {
        let frame = ServerFrame::error(ErrorCode::RateLimit, "slow down");
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({"type": "error", "code": "RATE_LIMIT", "message": "slow down"})
        );
        assert_eq!(ServerFrame::from_json(&frame.to_json().unwrap()).unwrap(), frame);
        assert_eq!(ErrorCode::NotJoined.to_string(), "NOT_JOINED");
    }

    #[test]
    fn test_error_code_names_match_wire_form() {
        let all = [
            ErrorCode::InvalidName,
            ErrorCode::InvalidMessage,
            ErrorCode::NotJoined,
            ErrorCode::RateLimit,
            ErrorCode::InternalError,
        ];
        for code in all {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
            let parsed: ErrorCode = serde_json::from_value(json!(code.to_string())).unwrap();
            assert_eq!(parsed, code);
        }
    }
}
