//! HTTP error mapping for the admin API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use posbridge_core::errors::{ConfigurationError, DatabaseError, Error};
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

/// Status mapping for the domain taxonomy. Upstream POS trouble is a bad
/// gateway from the admin's point of view, not a server fault.
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Configuration(ConfigurationError::Invalid(_)) => StatusCode::BAD_REQUEST,
        Error::Configuration(ConfigurationError::Inactive(_)) => StatusCode::CONFLICT,
        Error::Configuration(_) => StatusCode::NOT_FOUND,
        Error::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        Error::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Auth(_) => StatusCode::BAD_GATEWAY,
        Error::Network(_) => StatusCode::BAD_GATEWAY,
        Error::Capacity(_) => StatusCode::CONFLICT,
        Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(err) => status_for(err),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
