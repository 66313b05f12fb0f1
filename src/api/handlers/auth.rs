//! Login and logout.
//!
//! Flow Overview (login):
//! 1) Require username, then password.
//! 2) Look the user up; unknown users and wrong passwords get the same answer.
//! 3) Mint a fresh session token for the user and retire the presented one.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{Credentials, SuccessResponse};
use crate::{
    api::{
        error::{ApiError, ErrorResponse},
        state::AuthState,
    },
    session::{extract_session_token, session_cookie},
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Logged in; sets a new session cookie", body = SuccessResponse),
        (status = 422, description = "Missing field or bad credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(headers, state, payload))]
pub async fn login(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let credentials = Credentials::from_payload(payload)?;
    let username = credentials.username().ok_or(ApiError::MissingUsername)?;
    let password = credentials.password().ok_or(ApiError::MissingPassword)?;

    let Some(user) = state.users().find_by_username(username).await? else {
        return Err(ApiError::BadCredentials);
    };

    let valid = state
        .hasher()
        .verify(password, &user.password_hash)
        .await
        .map_err(ApiError::Verify)?;
    if !valid {
        return Err(ApiError::BadCredentials);
    }

    let previous = extract_session_token(&headers);
    let token = state
        .sessions()
        .login(previous.as_deref(), &user.username)
        .await
        .map_err(|err| {
            error!("Failed to create session: {err:#}");
            ApiError::Session
        })?;

    info!(username = %user.username, "user logged in");

    let cookie = session_cookie(&token, state.config().cookie_secure()).map_err(|err| {
        error!("Failed to build session cookie: {err}");
        ApiError::Session
    })?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    Ok((response_headers, SuccessResponse::ok()).into_response())
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", body = SuccessResponse),
        (status = 422, description = "No logged-in session", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(headers, state))]
pub async fn logout(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AuthState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = extract_session_token(&headers).ok_or(ApiError::NotLoggedIn)?;
    if !state.sessions().logout(&token).await {
        return Err(ApiError::NotLoggedIn);
    }

    info!("user logged out");

    Ok(SuccessResponse::ok())
}
