//! Input rules for display names and message bodies
//!
//! Both rules trim surrounding whitespace first and count Unicode scalar
//! values, not bytes. Names are stored trimmed; message bodies are stored
//! exactly as sent.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::DomainError;

/// Maximum display name length in characters
pub const NAME_MAX_CHARS: usize = 50;

/// Maximum message length in characters
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Join request as received from a client
#[derive(Debug, Clone, Validate)]
pub struct JoinRequest {
    #[validate(custom(function = "display_name_rule"))]
    pub name: String,
}

/// Chat message request as received from a client
#[derive(Debug, Clone, Validate)]
pub struct SendMessageRequest {
    #[validate(custom(function = "message_content_rule"))]
    pub content: String,
}

fn display_name_rule(name: &str) -> Result<(), ValidationError> {
    check_trimmed_length(name, NAME_MAX_CHARS, "name", "Please enter a name", || {
        format!("Name must be at most {NAME_MAX_CHARS} characters")
    })
}

fn message_content_rule(content: &str) -> Result<(), ValidationError> {
    check_trimmed_length(
        content,
        MESSAGE_MAX_CHARS,
        "content",
        "Please enter a message",
        || format!("Message must be at most {MESSAGE_MAX_CHARS} characters"),
    )
}

fn check_trimmed_length(
    raw: &str,
    max: usize,
    code: &'static str,
    empty: &'static str,
    too_long: impl FnOnce() -> String,
) -> Result<(), ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(code).with_message(Cow::Borrowed(empty)));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(code).with_message(Cow::Owned(too_long())));
    }
    Ok(())
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .into_values()
        .flatten()
        .find_map(|err| err.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| errors.to_string())
}

/// Validate a display name, returning the trimmed name
pub fn validate_display_name(raw: &str) -> Result<String, DomainError> {
    let request = JoinRequest {
        name: raw.to_string(),
    };
    request
        .validate()
        .map_err(|e| DomainError::InvalidName(first_message(&e)))?;
    Ok(raw.trim().to_string())
}

/// Validate a message body. The body itself is left untouched.
pub fn validate_message_content(raw: &str) -> Result<(), DomainError> {
    let request = SendMessageRequest {
        content: raw.to_string(),
    };
    request
        .validate()
        .map_err(|e| DomainError::InvalidMessage(first_message(&e)))
}
