//! User persistence.
//!
//! Handlers only talk to [`UserStore`]; the server picks [`PgUserStore`] when a
//! DSN is configured and falls back to [`MemoryUserStore`] otherwise.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// A registered user. Never mutated once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// PHC-format Argon2id hash, never the plaintext.
    pub password_hash: String,
}

/// Input for [`UserStore::create`].
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

impl NewUser {
    /// Schema checks shared by every store backend.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] when the username is blank.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.username.trim().is_empty() {
            return Err(StoreError::Validation(
                "user validation failed: username is required".to_string(),
            ));
        }
        Ok(())
    }

    fn into_user(self) -> User {
        User {
            id: Uuid::now_v7(),
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("duplicate key error: username {0:?} already exists")]
    Duplicate(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and return the stored record.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users in creation order.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Cheap liveness check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_username() {
        let user = NewUser {
            username: "  ".to_string(),
            password_hash: "$argon2id$".to_string(),
        };
        assert!(matches!(user.validate(), Err(StoreError::Validation(_))));
    }
}
