//! Repository traits (ports) - the durable store the room talks to
//!
//! The gateway only ever sees these traits; `room-db` provides a PostgreSQL
//! implementation and an in-memory one.

use async_trait::async_trait;

use crate::entities::{Message, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Most recently active user carrying exactly this display name
    async fn find_latest_by_name(&self, name: &str) -> RepoResult<Option<User>>;

    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Mark online, bind to `socket_id`, bump last-active; returns the updated row
    async fn set_online(&self, id: Snowflake, socket_id: &str) -> RepoResult<User>;

    /// Mark offline, clear the socket binding, bump last-active
    async fn set_offline(&self, id: Snowflake) -> RepoResult<User>;

    /// Bump last-active only
    async fn touch(&self, id: Snowflake) -> RepoResult<()>;

    /// Online users ordered by name
    async fn find_online(&self) -> RepoResult<Vec<User>>;

    async fn count_online(&self) -> RepoResult<i64>;

    async fn rename(&self, id: Snowflake, name: &str) -> RepoResult<()>;

    /// Remove the user; their messages keep the name snapshot but lose the sender id
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Up to `limit` messages, newest first
    async fn find_recent(&self, limit: i64) -> RepoResult<Vec<Message>>;

    async fn count(&self) -> RepoResult<i64>;

    /// Delete every message, returning how many were removed
    async fn delete_all(&self) -> RepoResult<u64>;
}
