//! # Password hashing and verification (Argon2id)
//!
//! - [`Hasher::hash`] generates a random salt via [`OsRng`], hashes the plaintext
//!   with the configured Argon2id parameters, and returns a PHC-format string
//!   (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`). This is what the user store
//!   keeps as `password_hash`.
//! - [`Hasher::verify`] parses a PHC-format hash and checks the plaintext against it.
//!   Returns `Ok(false)` on mismatch and `Err` only when the stored hash is malformed.
//!
//! Both run on the blocking pool since Argon2 is deliberately memory and CPU hard.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[source] password_hash::Error),
    #[error("invalid password hash")]
    InvalidHash(#[source] password_hash::Error),
    #[error("password worker failed")]
    Worker(#[from] task::JoinError),
}

/// Argon2id hasher. `Default` uses the crate's recommended parameters.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    params: Params,
}

impl Hasher {
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password into a PHC-format string.
    ///
    /// # Errors
    /// Returns an error if Argon2 rejects the input or the blocking task panics.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(PasswordError::Hash)
        })
        .await?
    }

    /// Check a plaintext password against a stored PHC hash.
    ///
    /// Parameters are read from the hash itself, so hashes produced with other
    /// costs still verify.
    ///
    /// # Errors
    /// Returns an error if the stored hash cannot be parsed.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        let hash = hash.to_owned();
        task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash).map_err(PasswordError::InvalidHash)?;
            Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await?
    }
}
