use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handlers::{images, metadata, provider},
    infra::middleware::debug_log,
};

/// Create the full provider router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Provider surface
        .route("/", get(provider::capabilities))
        .route("/health", get(provider::health))
        // Metadata endpoints
        .route("/library/metadata/matches", post(metadata::match_scenes))
        .route("/library/metadata/{rating_key}", get(metadata::get_metadata))
        .route(
            "/library/metadata/{rating_key}/extras",
            get(metadata::get_metadata_extras),
        )
        // Artwork endpoints
        .route(
            "/stash/scene/{scene_id}/screenshot",
            get(images::scene_screenshot),
        )
        .route(
            "/stash/performer/{performer_id}/image",
            get(images::performer_image),
        )
        .route(
            "/stash/group/{group_id}/front",
            get(images::group_front_image),
        )
        .route("/stash/scene/{scene_id}/poster", get(images::scene_poster))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            debug_log::log_responses,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
