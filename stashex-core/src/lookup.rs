//! Query + translate orchestration with write-through caching.
//!
//! One service instance is shared by every request handler. Transport
//! failures are logged and surfaced as a miss; they never escape as
//! errors.

use std::sync::Arc;

use stashex_model::MediaContainer;
use tracing::{debug, error};

use crate::cache::ResponseCache;
use crate::query::{SceneFilter, scene_query};
use crate::stash::StashClient;
use crate::translate::{TranslateOptions, translate_scenes};

#[derive(Debug)]
pub struct SceneLookupService {
    stash: Arc<StashClient>,
    cache: ResponseCache,
    options: TranslateOptions,
}

impl SceneLookupService {
    pub fn new(stash: Arc<StashClient>, cache: ResponseCache, options: TranslateOptions) -> Self {
        Self {
            stash,
            cache,
            options,
        }
    }

    /// Look up scenes whose file path contains the given filename.
    pub async fn find_by_filename(&self, filename: &str) -> Option<MediaContainer> {
        self.lookup(SceneFilter::Filename(filename.to_string())).await
    }

    /// Look up the scene embedded in a rating key's numeric suffix.
    pub async fn find_by_rating_key(&self, rating_key: &str) -> Option<MediaContainer> {
        self.lookup(SceneFilter::RatingKey(rating_key.to_string())).await
    }

    async fn lookup(&self, filter: SceneFilter) -> Option<MediaContainer> {
        let clause = filter.filter_clause()?;
        let fingerprint = format!("filter:{clause}");

        if let Some(document) = self.cache.get(&fingerprint) {
            debug!("cache hit for {fingerprint}");
            return Some(document);
        }

        let scenes = match self.stash.find_scenes(&scene_query(&clause)).await {
            Ok(scenes) => scenes,
            Err(err) => {
                error!("failed to query Stash: {err}");
                return None;
            }
        };

        let Some(document) = translate_scenes(scenes, &self.options) else {
            debug!("no scenes found for filter: {clause}");
            return None;
        };

        self.cache.insert(&fingerprint, document.clone());
        Some(document)
    }
}
