//! # room-core
//!
//! Domain layer for the single chat room: entities, identifiers, input rules,
//! and the store contract the gateway consumes.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod validation;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, MessageKind, MessageKindParseError, User};
pub use error::DomainError;
pub use traits::{MessageRepository, RepoResult, UserRepository};
pub use validation::{
    validate_display_name, validate_message_content, JoinRequest, SendMessageRequest,
    MESSAGE_MAX_CHARS, NAME_MAX_CHARS,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
