//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: String,
    pub content: String,
    /// `USER` or `SYSTEM`
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    #[inline]
    pub fn is_system(&self) -> bool {
        self.kind == "SYSTEM"
    }
}
