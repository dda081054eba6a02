//! Response shapes for the Plex custom metadata provider protocol.
//!
//! Plex expects `MediaContainer` envelopes with PascalCase list keys and
//! camelCase scalar keys. Optional scalars are omitted entirely rather
//! than serialized as null; Plex treats a present-but-null field as a
//! value in some agent paths.

use serde::{Deserialize, Serialize};

use crate::ids::PROVIDER_IDENTIFIER;

/// Top-level envelope wrapping every metadata response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaContainerEnvelope {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer,
}

impl MediaContainerEnvelope {
    pub fn new(media_container: MediaContainer) -> Self {
        Self { media_container }
    }

    /// Empty-but-valid envelope used to surface a miss to Plex.
    pub fn empty() -> Self {
        Self::new(MediaContainer::empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContainer {
    pub offset: u64,
    pub total_size: u64,
    pub identifier: String,
    pub size: u64,
    #[serde(rename = "Metadata")]
    pub metadata: Vec<MetadataItem>,
}

impl MediaContainer {
    /// Container holding the given items, with the pagination fields
    /// derived from the item count.
    pub fn with_items(metadata: Vec<MetadataItem>) -> Self {
        let count = metadata.len() as u64;
        Self {
            offset: 0,
            total_size: count,
            identifier: PROVIDER_IDENTIFIER.to_string(),
            size: count,
            metadata,
        }
    }

    pub fn empty() -> Self {
        Self::with_items(Vec::new())
    }
}

/// A single translated scene in the shape Plex consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataItem {
    pub guid: String,
    pub key: String,
    pub rating_key: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    pub summary: String,
    pub art: String,
    pub thumb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originally_available_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(rename = "Director", skip_serializing_if = "Option::is_none")]
    pub director: Option<Vec<TagEntry>>,
    #[serde(rename = "Genre", skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<TagEntry>>,
    #[serde(rename = "Role", skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<TagEntry>>,
    #[serde(rename = "Collection", skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<TagEntry>>,
    #[serde(rename = "Chapter", skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterEntry>>,
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaEntry>>,
}

/// Tag-shaped entry shared by Director, Genre, Role and Collection
/// lists. Only roles carry a thumb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

impl TagEntry {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            thumb: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    pub tag: String,
    pub index: u32,
    pub start_time_offset: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_frame_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_resolution: Option<String>,
    #[serde(rename = "Part", skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<PartEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Capability document returned from the provider root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDocument {
    #[serde(rename = "MediaProvider")]
    pub media_provider: ProviderDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub identifier: String,
    pub title: String,
    pub version: String,
    #[serde(rename = "Types")]
    pub types: Vec<ProviderType>,
    #[serde(rename = "Feature")]
    pub features: Vec<ProviderFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderType {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(rename = "Scheme")]
    pub schemes: Vec<ProviderScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderScheme {
    pub scheme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
}

impl ProviderDocument {
    /// The fixed descriptor for this provider: movie-typed scheme plus
    /// the metadata and match features.
    pub fn stash() -> Self {
        Self {
            media_provider: ProviderDescriptor {
                identifier: PROVIDER_IDENTIFIER.to_string(),
                title: "Stash Plex Metadata Provider".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                types: vec![ProviderType {
                    kind: 1,
                    schemes: vec![ProviderScheme {
                        scheme: PROVIDER_IDENTIFIER.to_string(),
                    }],
                }],
                features: vec![
                    ProviderFeature {
                        kind: "metadata".to_string(),
                        key: "/library/metadata".to_string(),
                    },
                    ProviderFeature {
                        kind: "match".to_string(),
                        key: "/library/metadata/matches".to_string(),
                    },
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_envelope_has_valid_shape() {
        let value = serde_json::to_value(MediaContainerEnvelope::empty()).unwrap();
        assert_eq!(value["MediaContainer"]["offset"], 0);
        assert_eq!(value["MediaContainer"]["totalSize"], 0);
        assert_eq!(value["MediaContainer"]["size"], 0);
        assert_eq!(value["MediaContainer"]["identifier"], PROVIDER_IDENTIFIER);
        assert!(value["MediaContainer"]["Metadata"].as_array().unwrap().is_empty());
    }

    #[test]
    fn optional_scalars_are_omitted_not_null() {
        let item = MetadataItem {
            guid: "plex://movie/stash-video-1".into(),
            rating_key: "stash-video-1".into(),
            media_type: "movie".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&item).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("year"));
        assert!(!object.contains_key("rating"));
        assert!(!object.contains_key("Genre"));
        assert_eq!(object["ratingKey"], "stash-video-1");
        assert_eq!(object["type"], "movie");
    }

    #[test]
    fn list_keys_serialize_pascal_case() {
        let item = MetadataItem {
            genres: Some(vec![TagEntry::new("tag-a")]),
            chapters: Some(vec![ChapterEntry {
                tag: "intro".into(),
                index: 1,
                start_time_offset: 12500,
            }]),
            ..Default::default()
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["Genre"][0]["tag"], "tag-a");
        assert_eq!(value["Chapter"][0]["startTimeOffset"], 12500);
        // A role-less tag entry must not serialize an empty thumb.
        assert!(value["Genre"][0].as_object().unwrap().get("thumb").is_none());
    }

    #[test]
    fn container_totals_follow_item_count() {
        let container =
            MediaContainer::with_items(vec![MetadataItem::default(), MetadataItem::default()]);
        assert_eq!(container.total_size, 2);
        assert_eq!(container.size, 2);
        assert_eq!(container.offset, 0);
    }
}
