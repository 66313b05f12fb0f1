//! In-memory session store keyed by an opaque cookie token.
//!
//! Flow Overview: every login mints a fresh token bound to the username and
//! retires the token the client presented, every later request presents the
//! token in the `authgate_session` cookie, and logout unbinds the username
//! while keeping the token.
//!
//! Only the SHA-256 of a token is kept, so a dump of the map cannot be replayed
//! as cookies.

use anyhow::{Context, Result};
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::debug;

pub const SESSION_COOKIE_NAME: &str = "authgate_session";

#[derive(Debug)]
struct SessionEntry {
    username: Option<String>,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    entries: RwLock<HashMap<Vec<u8>, SessionEntry>>,
    /// Idle timeout; `None` keeps sessions until the process exits.
    ttl: Option<Duration>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.last_seen) > ttl)
    }

    /// Remove the entry under `key` if it has been idle past the TTL.
    fn evict_if_expired(
        &self,
        entries: &mut HashMap<Vec<u8>, SessionEntry>,
        key: &[u8],
        now: Instant,
    ) {
        if entries
            .get(key)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            debug!("evicting expired session");
            entries.remove(key);
        }
    }

    /// Username bound to the token, if the session is live and logged in.
    ///
    /// Touches the session so active clients are not expired.
    pub async fn username(&self, token: &str) -> Option<String> {
        let key = hash_session_token(token);
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.evict_if_expired(&mut entries, &key, now);

        let entry = entries.get_mut(&key)?;
        entry.last_seen = now;
        entry.username.clone()
    }

    /// Bind `username` to a newly minted token and return it.
    ///
    /// The token the client presented, if any, is dropped so a token known
    /// before authentication never becomes an authenticated one.
    ///
    /// # Errors
    /// Returns an error if the OS random generator fails.
    pub async fn login(&self, previous: Option<&str>, username: &str) -> Result<String> {
        let token = generate_session_token()?;
        let mut entries = self.entries.write().await;

        if let Some(previous) = previous
            && entries.remove(&hash_session_token(previous)).is_some()
        {
            debug!("retired previous session token");
        }

        entries.insert(
            hash_session_token(&token),
            SessionEntry {
                username: Some(username.to_string()),
                last_seen: Instant::now(),
            },
        );
        Ok(token)
    }

    /// Unbind the username from the session. Returns `false` when the session
    /// was not logged in to begin with.
    pub async fn logout(&self, token: &str) -> bool {
        let key = hash_session_token(token);
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.evict_if_expired(&mut entries, &key, now);

        match entries.get_mut(&key) {
            Some(entry) => {
                entry.last_seen = now;
                entry.username.take().is_some()
            }
            None => false,
        }
    }

    /// Drop every expired entry.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }
}

/// Create a new session token for the auth cookie.
///
/// # Errors
/// Returns an error if the OS random generator fails.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values are never kept server side.
#[must_use]
pub fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Build an `HttpOnly` cookie for the session token.
///
/// No `Max-Age` is set: expiry is decided server side by the sliding idle TTL.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session token out of the `Cookie` header(s).
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}
