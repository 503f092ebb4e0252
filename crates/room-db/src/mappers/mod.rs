//! Entity to model mappers
//!
//! Conversions between domain entities (room-core) and database models.
//! - `From<Model> for Entity` / `TryFrom<Model> for Entity`: database rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod message;
mod user;

pub use message::MessageInsert;
pub use user::UserInsert;
