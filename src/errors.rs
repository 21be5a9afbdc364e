use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The full failure taxonomy of the API. Every handler returns
/// `Result<_, ApiError>`; the `IntoResponse` impl maps each variant to a
/// status code and a `{ "msg": string }` JSON body, matching the wire
/// contract of the auth gate and the validation layer.
///
/// Policy and validation failures carry short human-readable messages.
/// Unexpected store failures (`Database`, `Internal`) are logged with their
/// underlying cause and collapsed to a generic 500 message so internals are
/// never leaked to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input; carries the first failing field's message.
    #[error("{0}")]
    Validation(String),

    /// Registration against an email or username that is already taken.
    #[error("{0}")]
    DuplicateIdentity(String),

    /// Login failure. One fixed message for both unknown identifier and
    /// wrong password, so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No token presented, or the token was rejected.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but the authorization policy denied the action.
    #[error("{0}")]
    Unauthorized(String),

    /// Role-change request naming a role outside the assignable set.
    #[error("Invalid role specified")]
    InvalidRoleValue,

    /// Role-change request targeting an admin account.
    #[error("Cannot change the role of an admin")]
    ProtectedRole,

    #[error("{0}")]
    NotFound(String),

    /// Store failure. Terminal for the request; never retried.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Any other unexpected failure (hashing, token signing).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateIdentity(_)
            | ApiError::InvalidCredentials
            | ApiError::InvalidRoleValue
            | ApiError::ProtectedRole => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 5xx: log the real cause, hand the caller a generic message.
        let msg = match &self {
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                "Server error".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "msg": msg }))).into_response()
    }
}
