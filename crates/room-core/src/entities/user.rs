//! User entity - a display name present (or once present) in the room

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A chat participant
///
/// Users are not accounts: a user row is looked up by display name on join
/// and reused when the same name comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub is_online: bool,
    /// Connection id of the connection that last joined as this user
    pub socket_id: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user that is online on the given connection
    pub fn new_online(id: Snowflake, name: String, socket_id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            is_online: true,
            socket_id: Some(socket_id),
            last_active_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_online(&mut self, socket_id: String) {
        let now = Utc::now();
        self.is_online = true;
        self.socket_id = Some(socket_id);
        self.last_active_at = now;
        self.updated_at = now;
    }

    /// Go offline and drop the transport affinity
    pub fn mark_offline(&mut self) {
        let now = Utc::now();
        self.is_online = false;
        self.socket_id = None;
        self.last_active_at = now;
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }
}
