//! Session - a joined connection

use room_core::Snowflake;

use super::ConnectionHandle;

/// A connection that has joined the room
///
/// `user_name` is the display name at join time and is what gets stamped on
/// the user's messages.
#[derive(Debug, Clone)]
pub struct Session {
    pub conn_id: String,
    pub user_id: Snowflake,
    pub user_name: String,
    pub handle: ConnectionHandle,
}

impl Session {
    pub fn new(conn_id: String, user_id: Snowflake, user_name: String, handle: ConnectionHandle) -> Self {
        Self {
            conn_id,
            user_id,
            user_name,
            handle,
        }
    }
}

/// Generate a new opaque connection id
pub fn new_connection_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
