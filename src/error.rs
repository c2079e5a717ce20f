use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the error means one of the backing stores could not be read
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures of the external generative text service.
///
/// These never leave the generative augmenter: every variant is logged and
/// turned into an empty suggestion list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerativeError {
    #[error("generative service credential is not configured")]
    Unavailable,

    #[error("generative service did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("generative service unreachable: {0}")]
    Unreachable(String),

    #[error("generative service circuit is open")]
    CircuitOpen,

    #[error("generative service returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed generative response: {0}")]
    Malformed(String),
}

impl GenerativeError {
    /// Short label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            GenerativeError::Unavailable => "unavailable",
            GenerativeError::Timeout(_) => "timeout",
            GenerativeError::Unreachable(_) => "unreachable",
            GenerativeError::CircuitOpen => "circuit_open",
            GenerativeError::Upstream { .. } => "upstream",
            GenerativeError::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for GenerativeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest does not expose the configured duration on the error
            GenerativeError::Timeout(std::time::Duration::ZERO)
        } else if e.is_decode() {
            GenerativeError::Malformed(e.to_string())
        } else {
            GenerativeError::Unreachable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let response = AppError::InvalidInput("page must be >= 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_maps_to_server_error() {
        let response = AppError::Internal("store down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_cache_error_maps_to_server_error() {
        let error = AppError::from(redis::RedisError::from((redis::ErrorKind::IoError, "down")));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_failure_classification() {
        assert!(AppError::Internal("x".to_string()).is_store_failure());
        assert!(!AppError::InvalidInput("x".to_string()).is_store_failure());
    }

    #[test]
    fn test_generative_error_kind() {
        assert_eq!(GenerativeError::Unavailable.kind(), "unavailable");
        assert_eq!(
            GenerativeError::Timeout(std::time::Duration::from_secs(1)).kind(),
            "timeout"
        );
        assert_eq!(GenerativeError::CircuitOpen.kind(), "circuit_open");
    }
}
