use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// An authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A uniqueness conflict (duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A third-party service failure, carrying the upstream status to forward.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, msg.clone())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Conflict(ref msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }

            AppError::Upstream { status, ref message } => {
                tracing::error!("Upstream error ({}): {}", status, message);
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, message.clone())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
