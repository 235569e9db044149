use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The error taxonomy raised by the rule engines and translated to HTTP
/// responses at the edge:
///
/// - `AlreadyExists` — uniqueness violation on create (409).
/// - `InvalidState`  — an operation blocked by referential usage, e.g. deleting
///   a category that still has posts (409).
/// - `NotFound`      — lookup or delete of an absent record (404).
/// - `Unauthorized`  — failed credential or token checks (401).
/// - `Database`      — any persistence failure; logged, surfaced as an opaque 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid credentials".to_string()),
            ApiError::Database(e) => {
                // The underlying error is for the logs, not the client.
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::TokenSigning(e) => {
                tracing::error!("token signing error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_errors_map_to_409() {
        let resp = ApiError::AlreadyExists("dup".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = ApiError::InvalidState("busy".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError::NotFound("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_opaque_500s() {
        let resp = ApiError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
