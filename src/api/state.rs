//! Shared state handed to handlers and gates through an `Extension`.

use anyhow::{Context, Result};
use regex::Regex;
use std::{sync::Arc, time::Duration};

use crate::{password::Hasher, session::SessionStore, store::UserStore};

pub const DEFAULT_RESTRICTED_PATTERN: &str = "restricted";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: u64,
    cookie_secure: bool,
    restricted_pattern: String,
    hide_password_hash: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
            restricted_pattern: DEFAULT_RESTRICTED_PATTERN.to_string(),
            hide_password_hash: false,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_restricted_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.restricted_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_hide_password_hash(mut self, hide: bool) -> Self {
        self.hide_password_hash = hide;
        self
    }

    /// Idle session lifetime; `None` when configured as `0`.
    #[must_use]
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_seconds > 0).then(|| Duration::from_secs(self.session_ttl_seconds))
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn restricted_pattern(&self) -> &str {
        &self.restricted_pattern
    }

    #[must_use]
    pub fn hide_password_hash(&self) -> bool {
        self.hide_password_hash
    }
}

pub struct AuthState {
    config: AuthConfig,
    users: Arc<dyn UserStore>,
    sessions: SessionStore,
    hasher: Hasher,
    restricted: Regex,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the restricted path pattern is not a valid regex.
    pub fn new(config: AuthConfig, users: Arc<dyn UserStore>, hasher: Hasher) -> Result<Self> {
        let restricted = Regex::new(config.restricted_pattern()).with_context(|| {
            format!(
                "Invalid restricted path pattern: {}",
                config.restricted_pattern()
            )
        })?;
        let sessions = SessionStore::new(config.session_ttl());
        Ok(Self {
            config,
            users,
            sessions,
            hasher,
            restricted,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Whether the request path falls under the restricted naming convention.
    #[must_use]
    pub fn is_restricted(&self, path: &str) -> bool {
        self.restricted.is_match(path)
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("sessions", &self.sessions)
            .field("restricted", &self.restricted.as_str())
            .finish_non_exhaustive()
    }
}
