use axum::{Json, extract::Extension};
use std::sync::Arc;

use super::UserResponse;
use crate::{
    api::{error::ErrorResponse, state::AuthState},
    store::User,
};

/// The user is resolved by the `ensure_logged_in` route layer.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The logged-in user", body = UserResponse),
        (status = 422, description = "No session, or the user no longer exists", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn me(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(user): Extension<User>,
) -> Json<UserResponse> {
    Json(UserResponse::from_user(user, state.config()))
}
