//! Error type shared by every handler and gate.
//!
//! All failures are answered with `422`. The body shape depends on the failure
//! class: plain refusals carry `{"error": "..."}`, while failures bubbling up
//! from the store or the hasher carry `{"message": "...", "stack": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::{password::PasswordError, store::StoreError};

pub const STATUS_USER_ERROR: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Must provide username")]
    MissingUsername,
    #[error("Must provide password")]
    MissingPassword,
    #[error("Invalid JSON body")]
    InvalidBody,
    #[error("Couldn't hash password")]
    Hash(#[source] PasswordError),
    /// Shared by unknown usernames and wrong passwords.
    #[error("Bad credentials")]
    BadCredentials,
    #[error("Must be logged in")]
    NotLoggedIn,
    #[error("Must be logged in to access a restricted path")]
    Restricted,
    #[error("Couldn't start session")]
    Session,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Verify(PasswordError),
}

/// Documentation-only view of the two failure bodies.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Present for plain refusals.
    pub error: Option<String>,
    /// Present for store and hasher failures.
    pub message: Option<String>,
    pub stack: Option<String>,
}

impl ApiError {
    /// Whether the error carries an underlying error object rather than a
    /// fixed refusal text.
    fn is_object(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Verify(_))
    }
}

/// Render an error and its sources, one per line.
pub(crate) fn error_stack(err: &(dyn StdError + 'static)) -> String {
    let mut stack = format!("Error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        stack.push_str(&format!("\n    caused by: {cause}"));
        source = cause.source();
    }
    stack
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.is_object() {
            let stack = error_stack(&self);
            warn!(error = %self, stack = %stack, "request failed");
            json!({ "message": self.to_string(), "stack": stack })
        } else {
            match StdError::source(&self) {
                Some(cause) => debug!(error = %self, cause = %cause, "request refused"),
                None => debug!(error = %self, "request refused"),
            }
            json!({ "error": self.to_string() })
        };

        (STATUS_USER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> anyhow::Result<(StatusCode, Value)> {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&body)?))
    }

    #[tokio::test]
    async fn refusals_render_error_field() -> anyhow::Result<()> {
        let (status, body) = render(ApiError::BadCredentials).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "error": "Bad credentials" }));

        let (_, body) = render(ApiError::NotLoggedIn).await?;
        assert_eq!(body, json!({ "error": "Must be logged in" }));
        Ok(())
    }

    #[tokio::test]
    async fn store_errors_render_message_and_stack() -> anyhow::Result<()> {
        let err = ApiError::from(StoreError::Duplicate("alice".to_string()));
        let (status, body) = render(err).await?;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["message"],
            "duplicate key error: username \"alice\" already exists"
        );
        assert!(body["stack"].as_str().is_some_and(|s| s.starts_with("Error: ")));
        assert!(body.get("error").is_none());
        Ok(())
    }

    #[test]
    fn error_stack_lists_sources() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::RowNotFound));
        let stack = error_stack(&err);
        assert!(stack.starts_with("Error: database error"));
        assert!(stack.contains("caused by:"));
    }

    #[test]
    fn hash_failure_keeps_fixed_text() {
        let err = ApiError::Hash(PasswordError::InvalidHash(
            argon2::password_hash::Error::Password,
        ));
        assert_eq!(err.to_string(), "Couldn't hash password");
        assert!(!err.is_object());
    }

    #[tokio::test]
    async fn verify_failure_stack_names_the_cause() -> anyhow::Result<()> {
        let err = ApiError::Verify(PasswordError::InvalidHash(
            argon2::password_hash::Error::PhcStringField,
        ));
        let (status, body) = render(err).await?;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "invalid password hash");
        let stack = body["stack"].as_str().unwrap_or_default();
        assert!(stack.starts_with("Error: invalid password hash"));
        assert!(stack.contains("\n    caused by: "), "no cause in {stack:?}");
        Ok(())
    }
}
