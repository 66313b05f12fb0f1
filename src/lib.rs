//! # Authgate (session-based authentication)
//!
//! `authgate` registers users, logs them in and out, and answers "who am I"
//! for the holder of a session cookie.
//!
//! ## Sessions
//!
//! The server hands out an opaque `authgate_session` cookie on login. Only a
//! SHA-256 hash of the token is kept in memory, and a session is either
//! anonymous or bound to a single username.
//!
//! ## Access gates
//!
//! - Any request whose path matches the restricted pattern (default: contains
//!   `restricted`) needs a logged-in session before it reaches its handler.
//! - `/me` additionally re-resolves the user from the store on every call, so a
//!   user removed after login is treated as logged out.
//!
//! ## Errors
//!
//! Every failure is answered with `422 Unprocessable Entity`. Plain failures carry
//! `{"error": ...}`; failures raised by the store or the password hasher carry
//! `{"message": ..., "stack": ...}`.

pub mod api;
pub mod cli;
pub mod password;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
