use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{Credentials, UserResponse};
use crate::{
    api::{
        error::{ApiError, ErrorResponse},
        state::AuthState,
    },
    store::NewUser,
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = Credentials,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 422, description = "Missing password, hashing failure, or store rejection", body = ErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let credentials = Credentials::from_payload(payload)?;

    // The username is validated by the store; only the password needs an
    // explicit check since an empty string hashes just fine.
    let password = credentials.password().ok_or(ApiError::MissingPassword)?;
    let password_hash = state
        .hasher()
        .hash(password)
        .await
        .map_err(ApiError::Hash)?;

    let user = state
        .users()
        .create(NewUser {
            username: credentials.username.clone().unwrap_or_default(),
            password_hash,
        })
        .await?;

    info!(username = %user.username, "user registered");

    Ok(Json(UserResponse::from_user(user, state.config())))
}

#[utoipa::path(
    get,
    path = "/restricted/users",
    responses(
        (status = 200, description = "All registered users", body = [UserResponse]),
        (status = 422, description = "Not logged in or store failure", body = ErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn list(
    Extension(state): Extension<Arc<AuthState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users().find_all().await?;
    Ok(Json(
        users
            .into_iter()
            .map(|user| UserResponse::from_user(user, state.config()))
            .collect(),
    ))
}
