//! Error types shared by the stores, the identity gateway and the HTTP layer.
//!
//! Every failure a handler can see is an [`AppError`]. The variants follow the
//! platform's error taxonomy: missing session, rejected write, missing row and
//! an unavailable chat provider, plus the plumbing failures underneath them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rusqlite::ErrorCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Shown to the user whenever the chat provider cannot answer.
pub const CHAT_APOLOGY: &str =
    "I'm sorry, I'm having trouble answering right now. Please try again in a moment.";

#[derive(Error, Debug)]
pub enum AppError {
    /// No session, or the session token is unknown or expired
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// The store rejected a write (constraint, unknown column, bounds)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The row does not exist or belongs to someone else
    #[error("Not found: {0}")]
    NotFound(String),

    /// The language-model provider could not be reached or refused the call
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_)
            | AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                AppError::Validation(message.clone().unwrap_or_else(|| code.to_string()))
            }
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("no matching row".to_string()),
            _ => AppError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<crate::tools::ConversionError> for AppError {
    fn from(err: crate::tools::ConversionError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match &self {
            AppError::UpstreamUnavailable(_) => json!({
                "error": "Chat service unavailable",
                "message": CHAT_APOLOGY,
            }),
            other => json!({
                "error": other.to_string(),
                "code": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_becomes_validation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)").unwrap();
        let err = conn
            .execute("INSERT INTO t (name) VALUES (NULL)", [])
            .unwrap_err();

        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::Validation(ref m) if m.contains("NOT NULL")));
        assert_eq!(app_err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::AuthenticationRequired("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UpstreamUnavailable("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_response_carries_apology() {
        let response = AppError::UpstreamUnavailable("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
