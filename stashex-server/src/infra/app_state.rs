use std::fmt;
use std::sync::Arc;

use stashex_core::{
    PmsClient, PosterSource, PosterUploader, ResponseCache, SceneLookupService, StashClient,
    StashPosterSource, TranslateOptions,
};

use crate::infra::config::Config;

/// Shared handler state. Every service is owned here and injected;
/// there is no ambient global state, so the cache and upload ledger
/// live and die with the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stash: Arc<StashClient>,
    pub lookup: Arc<SceneLookupService>,
    pub posters: Arc<dyn PosterSource>,
    /// Present only when direct PMS poster upload is enabled.
    pub uploader: Option<Arc<PosterUploader>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let config = Arc::new(config);

        let stash = Arc::new(StashClient::new(
            config.stash.host.clone(),
            config.stash.api_key.clone(),
        ));

        let lookup = Arc::new(SceneLookupService::new(
            Arc::clone(&stash),
            ResponseCache::new(config.cache_ttl()),
            TranslateOptions {
                base_url: config.agent.base_url.clone(),
                stash_host: config.stash.host.clone(),
                poster_mode: config.agent.poster_mode,
            },
        ));

        let posters: Arc<dyn PosterSource> =
            Arc::new(StashPosterSource::new(Arc::clone(&stash)));

        let uploader = config.upload_settings().map(|(url, token)| {
            Arc::new(PosterUploader::new(
                Arc::new(PmsClient::new(url, token)),
                Arc::clone(&posters),
            ))
        });

        Self {
            config,
            stash,
            lookup,
            posters,
            uploader,
        }
    }
}
