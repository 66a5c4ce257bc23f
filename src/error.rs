use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::conflict::Conflict;
use crate::repository::RepositoryError;
use crate::service::ServiceError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String, Vec<Conflict>),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg, conflicts) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "message": msg,
                    "conflicts": conflicts,
                })),
            )
                .into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

/// Malformed or ill-typed bodies (an out-of-range day, a bad time) are client errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => err.into(),
            ServiceError::UnknownClass(_) => ApiError::BadRequest(value.to_string()),
            ServiceError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            ServiceError::Repository(RepositoryError::DuplicateClassName(name)) => {
                ApiError::Conflict(format!("class '{name}' already exists"), Vec::new())
            }
            ServiceError::Repository(RepositoryError::Overlap(conflicts)) => {
                ApiError::Conflict("placement overlaps existing lessons".into(), conflicts)
            }
            ServiceError::Repository(err) => {
                error!("repository error: {err}");
                ApiError::Internal("Failed to access schedule storage".into())
            }
        }
    }
}
