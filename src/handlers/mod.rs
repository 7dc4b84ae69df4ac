pub mod receive;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::wavefront::WriteError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    /// The request body could not be decompressed or decoded.
    BadRequest(String),
    /// The batch could not be delivered to the Wavefront proxy.
    Upstream(WriteError),
}

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Upstream(err) => {
                (StatusCode::BAD_GATEWAY, format!("Wavefront: {err}"))
            }
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

// ─── GET /healthz ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Health {
    pub status: &'static str,
}

pub async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}
