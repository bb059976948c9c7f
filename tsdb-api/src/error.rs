use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tsdb_core::{BlobId, EngineError};

/// Parse a path segment as a [`BlobId`]; a malformed id is reported exactly
/// as a `NotFound` would be (404, never 5xx), since the store never reveals
/// whether a syntactically invalid id "almost" matched something real.
pub fn parse_blob_id(raw: &str) -> Result<BlobId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Engine(EngineError::NotFound(format!("blob {raw} not found"))))
}

/// Transport-level errors layered on top of [`EngineError`]:
/// `InvalidSize`/`InvalidIdentifier`/`MissingFile` -> 4xx, `NotFound` -> 404,
/// `Internal` -> 500 with no implementation detail in the body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("file is required")]
    MissingMultipartField,

    #[error("malformed multipart upload: {0}")]
    MalformedMultipart(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Engine(EngineError::InvalidSize(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::InvalidIdentifier(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::MissingFile(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::Internal(detail)) => {
                tracing::error!(detail, "engine invariant violation");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MissingMultipartField => StatusCode::BAD_REQUEST,
            ApiError::MalformedMultipart(_) => StatusCode::BAD_REQUEST,
        };

        let detail = match &self {
            ApiError::Engine(EngineError::Internal(_)) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
