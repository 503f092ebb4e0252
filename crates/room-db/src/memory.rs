//! In-process store
//!
//! Both repositories share one set of tables behind a `parking_lot::Mutex`,
//! so a user delete can clear sender ids the same way the foreign key does
//! in PostgreSQL. No lock is held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use room_core::entities::{Message, User};
use room_core::error::DomainError;
use room_core::traits::{MessageRepository, RepoResult, UserRepository};
use room_core::value_objects::Snowflake;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Snowflake, User>,
    /// Insertion order
    messages: Vec<Message>,
}

/// Shared in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(&self) -> MemoryUserRepository {
        MemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn message_repo(&self) -> MemoryMessageRepository {
        MemoryMessageRepository {
            tables: Arc::clone(&self.tables),
        }
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryUserRepository {
    fn update<F>(&self, id: Snowflake, f: F) -> RepoResult<User>
    where
        F: FnOnce(&mut User),
    {
        let mut tables = self.tables.lock();
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        f(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_latest_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| u.name == name)
            .max_by_key(|u| (u.last_active_at, u.id))
            .cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.users.contains_key(&user.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate user id {}",
                user.id
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_online(&self, id: Snowflake, socket_id: &str) -> RepoResult<User> {
        self.update(id, |u| u.mark_online(socket_id.to_string()))
    }

    async fn set_offline(&self, id: Snowflake) -> RepoResult<User> {
        self.update(id, User::mark_offline)
    }

    async fn touch(&self, id: Snowflake) -> RepoResult<()> {
        self.update(id, User::touch).map(|_| ())
    }

    async fn find_online(&self) -> RepoResult<Vec<User>> {
        let mut online: Vec<User> = self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| u.is_online)
            .cloned()
            .collect();
        online.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(online)
    }

    async fn count_online(&self) -> RepoResult<i64> {
        let count = self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| u.is_online)
            .count();
        Ok(count as i64)
    }

    async fn rename(&self, id: Snowflake, name: &str) -> RepoResult<()> {
        self.update(id, |u| u.rename(name.to_string())).map(|_| ())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.users.remove(&id).is_none() {
            return Err(DomainError::UserNotFound(id));
        }
        for message in &mut tables.messages {
            if message.user_id == Some(id) {
                message.user_id = None;
            }
        }
        Ok(())
    }
}

/// In-memory implementation of MessageRepository
#[derive(Debug, Clone)]
pub struct MemoryMessageRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.tables.lock().messages.push(message.clone());
        Ok(())
    }

    async fn find_recent(&self, limit: i64) -> RepoResult<Vec<Message>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables
            .lock()
            .messages
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.tables.lock().messages.len() as i64)
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let deleted = tables.messages.len() as u64;
        tables.messages.clear();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> User {
        User::new_online(Snowflake::new(id), name.to_string(), format!("conn-{id}"))
    }

    #[tokio::test]
    async fn test_latest_by_name_prefers_most_recent() {
        let store = MemoryStore::new();
        let users = store.user_repo();

        let mut older = user(1, "Alice");
        older.last_active_at -= chrono::Duration::minutes(5);
        users.create(&older).await.unwrap();
        users.create(&user(2, "Alice")).await.unwrap();
        users.create(&user(3, "Bob")).await.unwrap();

        let found = users.find_latest_by_name("Alice").await.unwrap().unwrap();
        assert_eq!(found.id, Snowflake::new(2));
        assert!(users.find_latest_by_name("Carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_online_tracking() {
        let store = MemoryStore::new();
        let users = store.user_repo();
        users.create(&user(1, "Zed")).await.unwrap();
        users.create(&user(2, "Amy")).await.unwrap();

        let online = users.find_online().await.unwrap();
        let names: Vec<_> = online.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Amy", "Zed"]);

        let offline = users.set_offline(Snowflake::new(1)).await.unwrap();
        assert!(!offline.is_online);
        assert!(offline.socket_id.is_none());
        assert_eq!(users.count_online().await.unwrap(), 1);

        let back = users.set_online(Snowflake::new(1), "conn-9").await.unwrap();
        assert_eq!(back.socket_id.as_deref(), Some("conn-9"));
        assert_eq!(users.count_online().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let users = MemoryStore::new().user_repo();
        let err = users.touch(Snowflake::new(42)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(users.set_online(Snowflake::new(42), "c").await.is_err());
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let messages = MemoryStore::new().message_repo();
        for i in 1..=5 {
            let msg = Message::system(Snowflake::new(i), "Alice".into(), format!("m{i}"));
            messages.create(&msg).await.unwrap();
        }

        let recent = messages.find_recent(3).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m5", "m4", "m3"]);
        assert_eq!(messages.count().await.unwrap(), 5);

        assert_eq!(messages.delete_all().await.unwrap(), 5);
        assert_eq!(messages.count().await.unwrap(), 0);
        assert_eq!(messages.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_survives_rename_and_delete() {
        let store = MemoryStore::new();
        let users = store.user_repo();
        let messages = store.message_repo();

        let alice = user(1, "Alice");
        users.create(&alice).await.unwrap();
        let msg = Message::from_user(Snowflake::new(10), alice.id, alice.name.clone(), "hi".into());
        messages.create(&msg).await.unwrap();

        users.rename(alice.id, "Alicia").await.unwrap();
        let stored = &messages.find_recent(1).await.unwrap()[0];
        assert_eq!(stored.user_name, "Alice");
        assert_eq!(stored.user_id, Some(alice.id));

        users.delete(alice.id).await.unwrap();
        let stored = &messages.find_recent(1).await.unwrap()[0];
        assert_eq!(stored.user_name, "Alice");
        assert!(stored.user_id.is_none());
    }
}
