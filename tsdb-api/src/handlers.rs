use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dto::{
    iso_millis, BlobResponse, StatsResponse, SweepResponse, UpdateLastAccessedRequest,
};
use crate::error::{parse_blob_id, ApiError};
use crate::state::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /files` — multipart upload, field name `file`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file_field = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedMultipart(e.to_string()))?
    {
        if field.name() == Some("file") {
            file_field = Some(field);
            break;
        }
    }

    let field = file_field.ok_or(ApiError::MissingMultipartField)?;
    let filename = field.file_name().unwrap_or("upload.bin").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::MalformedMultipart(e.to_string()))?;

    let engine = state.engine.clone();
    let id = tokio::task::spawn_blocking(move || engine.create(filename, content_type, bytes))
        .await
        .expect("create task panicked")?;

    let descriptor = state
        .engine
        .get_metadata(id)
        .expect("descriptor must exist immediately after create");

    Ok((StatusCode::CREATED, Json(BlobResponse::from(descriptor))).into_response())
}

/// `GET /files/{id}` — full read; refreshes `last_accessed`.
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_blob_id(&id)?;
    let engine = state.engine.clone();
    let (descriptor, bytes) = tokio::task::spawn_blocking(move || engine.read(id))
        .await
        .expect("read task panicked")?;

    let mut response = (StatusCode::OK, bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&descriptor.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        "x-blob-id",
        HeaderValue::from_str(&descriptor.id.to_string())
            .expect("a hyphenated UUID is valid header ASCII"),
    );
    headers.insert("x-blob-tier", HeaderValue::from_static(descriptor.tier.as_str()));
    headers.insert(
        "x-blob-size",
        HeaderValue::from_str(&descriptor.size.to_string())
            .expect("a decimal integer is valid header ASCII"),
    );
    headers.insert(
        "x-blob-created-at",
        HeaderValue::from_str(&iso_millis(descriptor.created_at))
            .expect("an RFC3339 timestamp is valid header ASCII"),
    );
    headers.insert(
        "x-blob-last-accessed",
        HeaderValue::from_str(&iso_millis(descriptor.last_accessed))
            .expect("an RFC3339 timestamp is valid header ASCII"),
    );
    headers.insert(
        "x-blob-checksum",
        HeaderValue::from_str(&descriptor.checksum)
            .expect("a lowercase hex digest is valid header ASCII"),
    );

    Ok(response)
}

/// `GET /files/{id}/metadata` — descriptor only, never refreshes recency.
pub async fn metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlobResponse>, ApiError> {
    let id = parse_blob_id(&id)?;
    let engine = state.engine.clone();
    let descriptor = tokio::task::spawn_blocking(move || engine.get_metadata(id))
        .await
        .expect("metadata task panicked")?;
    Ok(Json(descriptor.into()))
}

/// `DELETE /files/{id}`.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_blob_id(&id)?;
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || engine.delete(id))
        .await
        .expect("delete task panicked")?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/tiering/run`.
pub async fn run_tiering(State(state): State<AppState>) -> Json<SweepResponse> {
    let engine = state.engine.clone();
    let summary = tokio::task::spawn_blocking(move || engine.run_tiering())
        .await
        .expect("tiering task panicked");
    Json(summary.into())
}

/// `GET /admin/stats`.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.engine.stats().into())
}

/// `POST /admin/files/{id}/update-last-accessed`.
pub async fn update_last_accessed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateLastAccessedRequest>,
) -> Result<StatusCode, ApiError> {
    let id = parse_blob_id(&id)?;
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || engine.admin_update_last_accessed(id, body.days_ago))
        .await
        .expect("admin task panicked")?;
    Ok(StatusCode::OK)
}
