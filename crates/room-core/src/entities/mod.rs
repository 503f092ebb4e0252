//! Domain entities - the room's users and messages

mod message;
mod user;

pub use message::{Message, MessageKind, MessageKindParseError};
pub use user::User;
