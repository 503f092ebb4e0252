//! # room-db
//!
//! Store layer implementing the `room-core` repository traits.
//!
//! ## Overview
//!
//! - Connection pool management and schema bootstrap for PostgreSQL
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - [`MemoryStore`], an in-process store for tests and single-node runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use room_db::{create_pool, ensure_schema, DatabaseConfig, PgUserRepository};
//! use room_core::UserRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     ensure_schema(&pool).await?;
//!     let users = PgUserRepository::new(pool);
//!     let online = users.count_online().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryMessageRepository, MemoryStore, MemoryUserRepository};
pub use pool::{create_pool, ensure_schema, DatabaseConfig, PgPool};
pub use repositories::{PgMessageRepository, PgUserRepository};
