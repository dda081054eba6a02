//! HTTP client for the Stash backend.

use bytes::Bytes;
use serde::Deserialize;
use stashex_model::SceneRecord;
use tracing::debug;

/// Timeout for every Stash call; the backend is expected to be on the
/// local network.
const STASH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum StashError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned {0}")]
    Status(reqwest::StatusCode),
}

/// A raw image fetched from Stash, relayed verbatim by the proxy.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// GraphQL response envelope for `findScenes`. Missing layers collapse
/// to an empty scene list, which callers treat as no-match.
#[derive(Debug, Deserialize)]
struct FindScenesEnvelope {
    data: Option<FindScenesData>,
}

#[derive(Debug, Deserialize)]
struct FindScenesData {
    #[serde(rename = "findScenes")]
    find_scenes: Option<FindScenes>,
}

#[derive(Debug, Deserialize)]
struct FindScenes {
    #[serde(default)]
    scenes: Vec<SceneRecord>,
}

#[derive(Debug, Clone)]
pub struct StashClient {
    http: reqwest::Client,
    host: String,
    api_key: Option<String>,
}

impl StashClient {
    /// `host` is the base URL of the Stash instance; `api_key` is sent
    /// as the `ApiKey` header when Stash has authentication enabled.
    pub fn new(host: impl Into<String>, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(STASH_TIMEOUT)
            .build()
            .expect("failed to build Stash HTTP client");
        Self {
            http,
            host: host.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// POST a GraphQL query and unwrap the `findScenes` scene list.
    pub async fn find_scenes(&self, query: &str) -> Result<Vec<SceneRecord>, StashError> {
        debug!("GraphQL query: {query}");
        debug!(
            "clickable GraphQL URL: {}/graphql?query={}",
            self.host,
            url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>()
        );

        let mut request = self
            .http
            .post(format!("{}/graphql", self.host))
            .json(&serde_json::json!({ "query": query }));
        if let Some(key) = &self.api_key {
            request = request.header("ApiKey", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StashError::Status(response.status()));
        }

        let envelope: FindScenesEnvelope = response.json().await?;
        Ok(envelope
            .data
            .and_then(|data| data.find_scenes)
            .map(|found| found.scenes)
            .unwrap_or_default())
    }

    /// Fetch an image resource below the Stash host, e.g.
    /// `/scene/42/screenshot`. The body and content type are returned
    /// untouched for the proxy to relay.
    pub async fn fetch_image(&self, path: &str) -> Result<FetchedImage, StashError> {
        let mut request = self.http.get(format!("{}{}", self.host, path));
        if let Some(key) = &self.api_key {
            request = request.header("ApiKey", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StashError::Status(response.status()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(FetchedImage {
            bytes: response.bytes().await?,
            content_type,
        })
    }

    pub async fn fetch_scene_screenshot(&self, scene_id: &str) -> Result<FetchedImage, StashError> {
        self.fetch_image(&format!("/scene/{scene_id}/screenshot")).await
    }

    pub async fn fetch_performer_image(
        &self,
        performer_id: &str,
    ) -> Result<FetchedImage, StashError> {
        self.fetch_image(&format!("/performer/{performer_id}/image")).await
    }

    pub async fn fetch_group_front_image(&self, group_id: &str) -> Result<FetchedImage, StashError> {
        self.fetch_image(&format!("/group/{group_id}/front_image")).await
    }
}
