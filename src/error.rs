use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
///
/// `NoMatch` and expired sessions are not represented here: they are ordinary
/// results (`IdentifyOutcome::NoMatch`, `Option::None`), not faults.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A pool construction error.
    #[error("Pool configuration error: {0}")]
    PoolConfig(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored row is missing a column or has the wrong type.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A template or session lookup miss.
    #[error("Resource not found")]
    NotFound,

    /// Encryption, decryption or vector (de)serialization failed.
    ///
    /// The message never carries plaintext or ciphertext bytes.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Two vectors of different lengths were compared.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector with zero magnitude was compared.
    #[error("Degenerate vector: zero magnitude")]
    DegenerateVector,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A missing session credential on a protected route.
    #[error("Invalid or expired session")]
    Unauthorized,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether this error means the backing store itself failed.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Pool(_)
                | AppError::PoolConfig(_)
                | AppError::Redis(_)
                | AppError::StoreUnavailable(_)
        )
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }

            AppError::PoolConfig(ref e) => {
                tracing::error!("Pool configuration error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Session store unavailable".to_string())
            }

            AppError::StoreUnavailable(ref msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }

            AppError::MissingData(ref column) => {
                tracing::error!("Stored record missing column: {}", column);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Crypto(ref msg) => {
                tracing::error!("Crypto error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Encryption error".to_string())
            }

            AppError::DimensionMismatch { expected, actual } => {
                tracing::debug!("Dimension mismatch: expected {}, got {}", expected, actual);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Vector dimension mismatch: expected {}, got {}", expected, actual),
                )
            }

            AppError::DegenerateVector => {
                tracing::debug!("Degenerate vector rejected");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Vector must have non-zero magnitude".to_string(),
                )
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Unauthorized => {
                tracing::warn!("Rejected request without a live session");
                (StatusCode::UNAUTHORIZED, "Invalid or expired session".to_string())
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

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
