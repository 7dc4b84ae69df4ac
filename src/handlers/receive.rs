use axum::{extract::State, http::StatusCode};
use bytes::Bytes;
use prost::Message;
use std::sync::Arc;

use crate::prompb;
use crate::AppState;

use super::AppError;

// ─── POST /receive ───────────────────────────────────────────────

/// Prometheus remote-write endpoint.
///
/// The body is a snappy-compressed protobuf `WriteRequest`. Decompression
/// and decode failures are the client's fault (400); a delivery failure to
/// the proxy is surfaced as 502 so Prometheus will treat the batch as lost.
pub async fn receive_write(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let raw = snap::raw::Decoder::new()
        .decompress_vec(&body)
        .map_err(|e| AppError::BadRequest(format!("snappy decode: {e}")))?;

    let request = prompb::WriteRequest::decode(raw.as_slice())
        .map_err(|e| AppError::BadRequest(format!("protobuf decode: {e}")))?;

    state.writer.write(&request).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ─── Tests ───────────────────────────────────────────────────────
