//! Image proxy and poster endpoints.
//!
//! Plex fetches artwork through this service because images.plex.tv
//! cannot reach private network addresses. Proxy responses relay the
//! Stash body and content type verbatim; failures map to a gateway
//! error with a short fixed body, never the backend's own error.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use stashex_core::{FetchedImage, StashError};
use tracing::error;

use crate::AppState;

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

/// `GET /stash/scene/{scene_id}/screenshot`
pub async fn scene_screenshot(
    State(state): State<AppState>,
    Path(scene_id): Path<String>,
) -> Response {
    proxy_image(state.stash.fetch_scene_screenshot(&scene_id).await)
}

/// `GET /stash/performer/{performer_id}/image`
pub async fn performer_image(
    State(state): State<AppState>,
    Path(performer_id): Path<String>,
) -> Response {
    proxy_image(state.stash.fetch_performer_image(&performer_id).await)
}

/// `GET /stash/group/{group_id}/front`
pub async fn group_front_image(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Response {
    proxy_image(state.stash.fetch_group_front_image(&group_id).await)
}

/// `GET /stash/scene/{scene_id}/poster` — letterboxed 2:3 poster, or a
/// gateway failure when no poster could be produced.
pub async fn scene_poster(
    State(state): State<AppState>,
    Path(scene_id): Path<String>,
) -> Response {
    match state.posters.render_poster(&scene_id).await {
        Some(poster) => (
            [
                (header::CONTENT_TYPE, "image/jpeg".to_string()),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
            ],
            poster,
        )
            .into_response(),
        None => (StatusCode::BAD_GATEWAY, "Image processing error").into_response(),
    }
}

fn proxy_image(fetched: Result<FetchedImage, StashError>) -> Response {
    match fetched {
        Ok(image) => (
            [
                (
                    header::CONTENT_TYPE,
                    image
                        .content_type
                        .unwrap_or_else(|| "image/jpeg".to_string()),
                ),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
            ],
            image.bytes,
        )
            .into_response(),
        Err(err) => {
            error!("image proxy failed: {err}");
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
