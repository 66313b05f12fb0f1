//! API handlers and the request/response shapes they share.

pub mod auth;
pub mod health;
pub mod me;
pub mod users;

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{error::ApiError, state::AuthConfig};
use crate::store::User;

/// Body of `POST /users` and `POST /login`.
#[derive(Default, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Accept a missing JSON body as an empty object, reject malformed JSON.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidBody`] when a JSON body cannot be decoded.
    pub fn from_payload(payload: Result<Json<Self>, JsonRejection>) -> Result<Self, ApiError> {
        match payload {
            Ok(Json(credentials)) => Ok(credentials),
            Err(JsonRejection::MissingJsonContentType(_)) => Ok(Self::default()),
            Err(_) => Err(ApiError::InvalidBody),
        }
    }

    // Empty strings count as missing.
    fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// `{"success": true}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    #[must_use]
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// User as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    /// Omitted when the server runs with `--hide-password-hash`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl UserResponse {
    #[must_use]
    pub fn from_user(user: User, config: &AuthConfig) -> Self {
        Self {
            id: user.id,
            username: user.username,
            password_hash: (!config.hide_password_hash()).then_some(user.password_hash),
        }
    }
}
