//! Provider root and liveness endpoints.

use axum::{Json, response::IntoResponse};
use serde_json::json;
use stashex_model::provider::ProviderDocument;

/// Client identifier Plex expects from every custom provider.
const CLIENT_IDENTIFIER: &str = "stash.plex.provider.metadata";

/// `GET /` capability document describing this provider and its
/// supported types and features.
pub async fn capabilities() -> impl IntoResponse {
    (
        [("X-Plex-Client-Identifier", CLIENT_IDENTIFIER)],
        Json(ProviderDocument::stash()),
    )
}

/// `GET /health` liveness payload.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
