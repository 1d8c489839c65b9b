use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The generator could not find a free code within the retry ceiling.
    #[error("Unable to generate a unique code after {0} attempts")]
    GenerationExhausted(u32),

    /// An I/O error while reading or writing the checkpoint file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error while reading or writing the checkpoint file.
    #[error("Serialization error: {0}")]
    Serialization(#[from] sonic_rs::Error),

    /// The messaging collaborator failed to deliver an outbound message.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::GenerationExhausted(attempts) => {
                tracing::error!("Code generation exhausted after {} attempts", attempts);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Code generation failed".to_string(),
                )
            }

            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "File system error".to_string())
            }

            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string())
            }

            AppError::Delivery(ref msg) => {
                tracing::warn!("Delivery failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Delivery failed".to_string())
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
