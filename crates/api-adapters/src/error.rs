//! Maps `DomainError` onto HTTP statuses and the `{success: false, error}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed request that never reached a service (bad JSON, bad query).
    #[error("{0}")]
    BadRequest(String),

    #[error("Route not found")]
    RouteNotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(err) => match err {
                DomainError::NotFound(..) => StatusCode::NOT_FOUND,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Domain(DomainError::Internal(detail)) => {
                tracing::error!(error = %detail, "request failed");
                "Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
