//! Request/response logging for debug mode.
//!
//! When debug is enabled, JSON responses to Plex are buffered and
//! logged pretty-printed. Image routes are exempt so binary bodies
//! never hit the log.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::AppState;

pub async fn log_responses(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    debug!("request: {method} {}", request.uri());

    let response = next.run(request).await;

    if !state.config.debug || path.starts_with("/stash/") {
        return response;
    }

    let status = response.status();
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("failed to buffer response body: {err}");
            return Response::from_parts(parts, Body::empty());
        }
    };

    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(parsed) => debug!(
            "response to Plex ({method} {path}) [{status}]:\n{}",
            serde_json::to_string_pretty(&parsed).unwrap_or_default()
        ),
        Err(_) => debug!("response body (raw, {} bytes)", bytes.len()),
    }

    Response::from_parts(parts, Body::from(bytes))
}
