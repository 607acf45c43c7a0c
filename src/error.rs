use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Everything an auth endpoint can fail with. Store errors are either
/// translated into a domain variant (unique violations become Taken) or
/// carried through as `Db` and reported as an internal error.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already in use")]
    EmailTaken,
    #[error("Username already in use")]
    UsernameTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No refresh token")]
    MissingRefreshToken,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Invalid or expired token")]
    InvalidAccessToken,
    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
    #[error("Failed to create access token")]
    TokenCreation(#[source] jsonwebtoken::errors::Error),
    #[error("Database error")]
    Db(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::EmailTaken => (StatusCode::CONFLICT, "Email already in use".into()),
            AuthError::UsernameTaken => (StatusCode::CONFLICT, "Username already in use".into()),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".into()),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".into()),
            AuthError::MissingRefreshToken => (StatusCode::UNAUTHORIZED, "No refresh token".into()),
            AuthError::InvalidRefreshToken => (StatusCode::UNAUTHORIZED, "Invalid refresh token".into()),
            AuthError::InvalidAccessToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".into())
            }
            AuthError::PasswordHash(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".into())
            }
            AuthError::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create access token".into(),
            ),
            AuthError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into()),
        };

        // The response body stays generic; the detail goes to the logs.
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
