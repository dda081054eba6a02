//! Metadata match and fetch endpoints.
//!
//! Every response is a well-formed `MediaContainer` envelope; a miss is
//! the empty envelope, never an error status.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use stashex_core::{PosterUploadJob, query::rating_key_scene_id};
use stashex_model::{MediaContainer, MediaContainerEnvelope};
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub filename: Option<String>,
    /// Comma-separated element names Plex wants stripped from items.
    pub exclude_elements: Option<String>,
}

/// `POST /library/metadata/matches`
pub async fn match_scenes(
    State(state): State<AppState>,
    Json(body): Json<MatchRequest>,
) -> Json<serde_json::Value> {
    let exclude: HashSet<String> = body
        .exclude_elements
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(filename) = body.filename.as_deref()
        && let Some(document) = state.lookup.find_by_filename(filename).await
    {
        let mut value = envelope_value(&MediaContainerEnvelope::new(document));
        strip_excluded(&mut value, &exclude);
        return Json(value);
    }

    Json(envelope_value(&MediaContainerEnvelope::empty()))
}

/// `GET /library/metadata/{rating_key}`
///
/// On a match with upload enabled, one detached poster upload job is
/// spawned; the response never waits on it.
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(rating_key): Path<String>,
) -> Json<MediaContainerEnvelope> {
    info!("fetching metadata for rating key {rating_key}");

    let Some(document) = state.lookup.find_by_rating_key(&rating_key).await else {
        return Json(MediaContainerEnvelope::empty());
    };

    if let Some(uploader) = &state.uploader
        && let Some(job) = upload_job_for(&rating_key, &document)
    {
        let uploader = uploader.clone();
        tokio::spawn(async move {
            uploader.run(job).await;
        });
    }

    Json(MediaContainerEnvelope::new(document))
}

/// `GET /library/metadata/{rating_key}/extras` — always empty.
pub async fn get_metadata_extras(Path(_rating_key): Path<String>) -> Json<MediaContainerEnvelope> {
    Json(MediaContainerEnvelope::empty())
}

/// Job descriptor for a matched fetch: numeric rating-key suffix plus
/// the resolved title PMS will be searched by. Either one missing means
/// no job.
fn upload_job_for(rating_key: &str, document: &MediaContainer) -> Option<PosterUploadJob> {
    let scene_id = rating_key_scene_id(rating_key)?.parse().ok()?;
    let title = document
        .metadata
        .first()
        .map(|item| item.title.clone())
        .filter(|title| !title.is_empty())?;
    Some(PosterUploadJob { scene_id, title })
}

fn envelope_value(envelope: &MediaContainerEnvelope) -> serde_json::Value {
    serde_json::to_value(envelope).unwrap_or_else(|err| {
        error!("failed to serialize envelope: {err}");
        serde_json::to_value(MediaContainerEnvelope::empty())
            .expect("empty envelope always serializes")
    })
}

/// Remove the named elements from every item in the envelope. Names are
/// arbitrary, so this operates on the serialized document rather than
/// the typed one.
fn strip_excluded(envelope: &mut serde_json::Value, exclude: &HashSet<String>) {
    if exclude.is_empty() {
        return;
    }
    let Some(items) = envelope
        .get_mut("MediaContainer")
        .and_then(|container| container.get_mut("Metadata"))
        .and_then(|metadata| metadata.as_array_mut())
    else {
        return;
    };
    for item in items {
        if let Some(object) = item.as_object_mut() {
            for name in exclude {
                object.remove(name);
            }
        }
    }
}
