use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use common::MediaKey;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{key}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Download an uploaded image",
    description = "Streams an avatar or recipe image by its content-addressed key. Keys never change content, so responses carry a long-lived `ETag`.",
    params(("key" = String, Path, description = "Media key `<sha256>.<ext>`")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 304, description = "Not modified"),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(key))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let key: MediaKey = key.parse()?;

    let etag_value = format!("\"{}\"", key.hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let reader = state.media.get_stream(&key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, key.format.mime_type())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
