//! Connection registry
//!
//! In-memory table of joined sessions keyed by connection id, backed by
//! `DashMap` for thread-safe access. Lookups by user and full scans are O(n).

use dashmap::DashMap;
use room_core::Snowflake;

use super::Session;

/// All live sessions
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<String, Session>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its connection id, returning any session it replaced
    pub fn add(&self, session: Session) -> Option<Session> {
        tracing::debug!(conn_id = %session.conn_id, user_id = %session.user_id, "Session added");
        self.sessions.insert(session.conn_id.clone(), session)
    }

    /// Remove a session; `None` if the connection never joined
    pub fn remove(&self, conn_id: &str) -> Option<Session> {
        let removed = self.sessions.remove(conn_id).map(|(_, session)| session);
        if removed.is_some() {
            tracing::debug!(conn_id = %conn_id, "Session removed");
        }
        removed
    }

    pub fn get(&self, conn_id: &str) -> Option<Session> {
        self.sessions.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Any session joined as `user_id`
    pub fn get_by_user(&self, user_id: Snowflake) -> Option<Session> {
        self.sessions
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every session, in no particular order
    pub fn all(&self) -> Vec<Session> {
        self.sessions.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionHandle;

    fn session(conn_id: &str, user_id: i64) -> Session {
        let (handle, _rx) = ConnectionHandle::channel();
        Session::new(
            conn_id.to_string(),
            Snowflake::new(user_id),
            format!("user{user_id}"),
            handle,
        )
    }

    #[test]
    fn test_add_get_remove() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.add(session("a", 1)).is_none());
        assert!(registry.add(session("b", 2)).is_none());
        assert_eq!(registry.count(), 2);

        assert_eq!(registry.get("a").unwrap().user_id, Snowflake::new(1));
        assert!(registry.get("zzz").is_none());

        assert_eq!(registry.remove("a").unwrap().conn_id, "a");
        assert!(registry.remove("a").is_none());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_get_by_user() {
        let registry = ConnectionRegistry::new();
        registry.add(session("a", 1));
        registry.add(session("b", 2));

        assert_eq!(registry.get_by_user(Snowflake::new(2)).unwrap().conn_id, "b");
        assert!(registry.get_by_user(Snowflake::new(3)).is_none());
    }

    #[test]
    fn test_all_returns_each_session_once() {
        let registry = ConnectionRegistry::new();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            registry.add(session(id, i as i64));
        }

        let mut ids: Vec<_> = registry.all().into_iter().map(|s| s.conn_id).collect();
        ids.sort();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_add_replaces_same_connection() {
        let registry = ConnectionRegistry::new();
        registry.add(session("a", 1));
        let replaced = registry.add(session("a", 2)).unwrap();
        assert_eq!(replaced.user_id, Snowflake::new(1));
        assert_eq!(registry.count(), 1);
    }
}
