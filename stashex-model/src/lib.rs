//! Core data model definitions shared across Stashex crates.
#![allow(missing_docs)]

pub mod ids;
pub mod numbers;
pub mod provider;
pub mod scene;

// Intentionally curated re-exports for downstream consumers.
pub use ids::{PROVIDER_IDENTIFIER, scene_guid, scene_metadata_key, scene_rating_key};
pub use provider::{
    ChapterEntry, MediaContainer, MediaContainerEnvelope, MediaEntry, MetadataItem, PartEntry,
    ProviderDescriptor, ProviderFeature, ProviderScheme, ProviderType, TagEntry,
};
pub use scene::{
    MarkerTag, SceneFile, SceneGroup, SceneGroupEntry, SceneMarker, ScenePerformer, SceneRecord,
    SceneStudio, SceneTag,
};
