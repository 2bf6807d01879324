use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Core error taxonomy. Validation and state-conflict errors are rejected
/// before any mutation; collaborator failures never surface here (they are
/// logged at the boundary instead).
#[derive(Error, Debug)]
pub enum Error {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({"error": message, "field": field}),
            ),
            Error::Conflict(reason) => (
                StatusCode::CONFLICT,
                serde_json::json!({"error": reason}),
            ),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": format!("{} not found", what)}),
            ),
            Error::Database(e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({"error": "internal server error"}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
