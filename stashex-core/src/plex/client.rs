//! HTTP client for the downstream Plex Media Server.
//!
//! Posters are pushed straight into the PMS because images.plex.tv
//! cannot reach private network addresses. Every call authenticates
//! with the server token as the `X-Plex-Token` query parameter.

use async_trait::async_trait;
use serde::Deserialize;

const PMS_QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const PMS_UPLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum PmsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("PMS returned {0}")]
    Status(reqwest::StatusCode),
}

/// A library item as returned by a section search. The external guid
/// may live on the item itself or in the nested `Guid` list depending
/// on the PMS version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PmsItem {
    #[serde(rename = "ratingKey")]
    pub rating_key: Option<String>,
    pub guid: Option<String>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PmsGuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PmsGuid {
    pub id: Option<String>,
}

impl PmsItem {
    pub fn matches_guid(&self, guid: &str) -> bool {
        self.guid.as_deref() == Some(guid)
            || self.guids.iter().any(|entry| entry.id.as_deref() == Some(guid))
    }
}

#[derive(Debug, Deserialize)]
struct SectionsEnvelope {
    #[serde(rename = "MediaContainer")]
    media_container: Option<SectionsContainer>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<SectionDirectory>,
}

#[derive(Debug, Deserialize)]
struct SectionDirectory {
    #[serde(rename = "type")]
    kind: Option<String>,
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "MediaContainer")]
    media_container: Option<SearchContainer>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PmsItem>,
}

/// Transport seam for the upload coordinator; mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PmsTransport: Send + Sync {
    /// Keys of all movie-type library sections.
    async fn movie_section_keys(&self) -> Result<Vec<String>, PmsError>;

    /// Search one section by title; returns every candidate item.
    async fn search_section(&self, section_key: &str, title: &str)
    -> Result<Vec<PmsItem>, PmsError>;

    /// Push poster bytes onto an item identified by its PMS rating key.
    async fn upload_poster(&self, rating_key: &str, poster: Vec<u8>) -> Result<(), PmsError>;
}

#[derive(Debug, Clone)]
pub struct PmsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PmsClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PMS_QUERY_TIMEOUT)
            .build()
            .expect("failed to build PMS HTTP client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl PmsTransport for PmsClient {
    async fn movie_section_keys(&self) -> Result<Vec<String>, PmsError> {
        let response = self
            .http
            .get(format!("{}/library/sections", self.base_url))
            .query(&[("X-Plex-Token", self.token.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PmsError::Status(response.status()));
        }

        let envelope: SectionsEnvelope = response.json().await?;
        Ok(envelope
            .media_container
            .unwrap_or_default()
            .directories
            .into_iter()
            .filter(|directory| directory.kind.as_deref() == Some("movie"))
            .filter_map(|directory| directory.key)
            .collect())
    }

    async fn search_section(
        &self,
        section_key: &str,
        title: &str,
    ) -> Result<Vec<PmsItem>, PmsError> {
        let response = self
            .http
            .get(format!(
                "{}/library/sections/{}/all",
                self.base_url, section_key
            ))
            .query(&[
                ("type", "1"),
                ("title", title),
                ("X-Plex-Token", self.token.as_str()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PmsError::Status(response.status()));
        }

        let envelope: SearchEnvelope = response.json().await?;
        Ok(envelope.media_container.unwrap_or_default().metadata)
    }

    async fn upload_poster(&self, rating_key: &str, poster: Vec<u8>) -> Result<(), PmsError> {
        let response = self
            .http
            .post(format!(
                "{}/library/metadata/{}/posters",
                self.base_url, rating_key
            ))
            .query(&[("X-Plex-Token", self.token.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .timeout(PMS_UPLOAD_TIMEOUT)
            .body(poster)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PmsError::Status(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_envelope_keeps_movie_directories_only() {
        let envelope: SectionsEnvelope = serde_json::from_str(
            r#"{"MediaContainer": {"Directory": [
                {"type": "movie", "key": "1"},
                {"type": "show", "key": "2"},
                {"type": "movie", "key": "3"}
            ]}}"#,
        )
        .unwrap();
        let keys: Vec<String> = envelope
            .media_container
            .unwrap_or_default()
            .directories
            .into_iter()
            .filter(|d| d.kind.as_deref() == Some("movie"))
            .filter_map(|d| d.key)
            .collect();
        assert_eq!(keys, ["1", "3"]);
    }

    #[test]
    fn item_matches_direct_or_nested_guid() {
        let direct = PmsItem {
            rating_key: Some("201".into()),
            guid: Some("plex://movie/stash-video-42".into()),
            guids: Vec::new(),
        };
        assert!(direct.matches_guid("plex://movie/stash-video-42"));
        assert!(!direct.matches_guid("plex://movie/stash-video-43"));

        let nested = PmsItem {
            rating_key: Some("202".into()),
            guid: Some("plex://movie/5d7768".into()),
            guids: vec![PmsGuid {
                id: Some("plex://movie/stash-video-42".into()),
            }],
        };
        assert!(nested.matches_guid("plex://movie/stash-video-42"));
    }

    #[test]
    fn base_url_is_normalized_without_trailing_slash() {
        let client = PmsClient::new("http://pms:32400/", "token");
        assert_eq!(client.base_url, "http://pms:32400");
    }
}
