//! HTTP route handlers
//!
//! - GET /camera - Live multipart stream
//! - GET /camera/snapshot - Latest frame as a single JPEG
//! - GET /camera/status - Capture status as JSON

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::capture::CaptureConfig;
use crate::stats::StatusReport;
use crate::store::FrameStore;

use super::broadcaster::Broadcaster;
use super::clients::ClientTracker;
use super::multipart::MultipartEncoder;
use super::pacing::PacingPolicy;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FrameStore>,
    pub capture: Arc<CaptureConfig>,
    pub encoder: Arc<MultipartEncoder>,
    pub pacing: PacingPolicy,
    pub clients: Arc<ClientTracker>,
    pub started_at: Instant,
}

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const ANY_ORIGIN: &str = "*";

/// Live stream endpoint
pub async fn stream_handler(State(state): State<AppState>) -> Response {
    let Some(slot) = state.clients.try_admit() else {
        tracing::warn!(active = state.clients.active(), "Stream client rejected: limit reached");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let broadcaster = Broadcaster::new(
        Arc::clone(&state.store),
        Arc::clone(&state.encoder),
        state.pacing,
        slot,
    );

    (
        [
            (header::CONTENT_TYPE, state.encoder.content_type().clone()),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY_ORIGIN)),
        ],
        Body::from_stream(broadcaster.into_stream()),
    )
        .into_response()
}

/// Single frame endpoint
pub async fn snapshot_handler(State(state): State<AppState>) -> Response {
    let Some(frame) = state.store.get() else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (header::CONTENT_LENGTH, HeaderValue::from(frame.len())),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY_ORIGIN)),
        ],
        Body::from(frame.data.clone()),
    )
        .into_response()
}

/// Capture status endpoint
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = StatusReport::collect(
        &state.store,
        &state.capture,
        state.clients.active(),
        state.started_at.elapsed(),
    );

    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY_ORIGIN))], Json(report))
}
