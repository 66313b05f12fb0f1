use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{NewUser, StoreError, User, UserStore};

/// Process-local user store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user, mimicking out-of-band administrative removal.
    pub async fn remove(&self, username: &str) -> bool {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|user| user.username != username);
        users.len() != before
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;

        // Check and insert under one write lock so concurrent registrations
        // cannot both claim the same username.
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(StoreError::Duplicate(user.username));
        }
        let user = user.into_user();
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: format!("$argon2id$v=19${username}"),
        }
    }

    #[tokio::test]
    async fn create_and_find() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("alice")).await?;

        let found = store.find_by_username("alice").await?;
        assert_eq!(found, Some(created));
        assert_eq!(store.find_by_username("bob").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        store.create(new_user("alice")).await?;

        let result = store.create(new_user("alice")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(name)) if name == "alice"));
        assert_eq!(store.find_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_empty_username() {
        let store = MemoryUserStore::new();
        let result = store.create(new_user("")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn find_all_keeps_creation_order() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        for name in ["carol", "alice", "bob"] {
            store.create(new_user(name)).await?;
        }

        let names: Vec<String> = store
            .find_all()
            .await?
            .into_iter()
            .map(|user| user.username)
            .collect();
        assert_eq!(names, ["carol", "alice", "bob"]);
        Ok(())
    }

    #[tokio::test]
    async fn remove_deletes_user() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        store.create(new_user("alice")).await?;

        assert!(store.remove("alice").await);
        assert!(!store.remove("alice").await);
        assert_eq!(store.find_by_username("alice").await?, None);
        Ok(())
    }
}
