//! Access checks.
//!
//! Two checks:
//! - [`require_session`]: the session carries a username.
//! - [`require_user`]: the session carries a username *and* that user still
//!   exists in the store.
//!
//! [`restricted_paths`] runs the first check for every request whose path
//! matches the restricted pattern, before any handler logic. [`ensure_logged_in`]
//! runs the second one as a route layer and hands the resolved [`User`] to the
//! handler through request extensions.

use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{error::ApiError, state::AuthState};
use crate::{session::extract_session_token, store::User};

/// Username bound to the caller's session, if any.
pub async fn session_username(headers: &HeaderMap, state: &AuthState) -> Option<String> {
    let token = extract_session_token(headers)?;
    state
        .sessions()
        .username(&token)
        .await
        .filter(|username| !username.is_empty())
}

/// Session presence check.
///
/// # Errors
/// Returns [`ApiError::NotLoggedIn`] for anonymous sessions.
pub async fn require_session(headers: &HeaderMap, state: &AuthState) -> Result<String, ApiError> {
    session_username(headers, state)
        .await
        .ok_or(ApiError::NotLoggedIn)
}

/// Session presence plus a fresh lookup of the user record.
///
/// # Errors
/// Returns [`ApiError::NotLoggedIn`] for anonymous sessions or users that no
/// longer exist, and [`ApiError::Store`] if the lookup fails.
pub async fn require_user(headers: &HeaderMap, state: &AuthState) -> Result<User, ApiError> {
    let username = require_session(headers, state).await?;
    match state.users().find_by_username(&username).await? {
        Some(user) => Ok(user),
        None => {
            debug!(username = %username, "session refers to a missing user");
            Err(ApiError::NotLoggedIn)
        }
    }
}

/// Route layer: resolve the logged-in user and attach it to the request.
pub async fn ensure_logged_in(
    Extension(state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match require_user(request.headers(), &state).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Router-wide filter: paths matching the restricted pattern need a session.
pub async fn restricted_paths(
    Extension(state): Extension<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.is_restricted(request.uri().path())
        && session_username(request.headers(), &state).await.is_none()
    {
        return ApiError::Restricted.into_response();
    }
    next.run(request).await
}
