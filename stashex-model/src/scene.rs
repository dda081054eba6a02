//! Scene records as returned by the Stash `findScenes` query.
//!
//! Every field except the id is optional. A record has no lifecycle
//! beyond the query response it arrived in; the translator only reads
//! and projects it.

use serde::Deserialize;

use crate::numbers::{lenient_f64, lenient_i64};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneRecord {
    #[serde(deserialize_with = "require_i64")]
    pub id: i64,
    pub code: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rating100: Option<i64>,
    pub details: Option<String>,
    pub director: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<SceneTag>,
    pub studio: Option<SceneStudio>,
    #[serde(default)]
    pub performers: Vec<ScenePerformer>,
    #[serde(default)]
    pub groups: Vec<SceneGroupEntry>,
    #[serde(default)]
    pub scene_markers: Vec<SceneMarker>,
    #[serde(default)]
    pub files: Vec<SceneFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneTag {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneStudio {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub image_path: Option<String>,
    pub parent_studio: Option<ParentStudio>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParentStudio {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenePerformer {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub image_path: Option<String>,
}

/// One entry of the scene's group memberships. Stash nests the group
/// itself one level down next to the scene's position in it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneGroupEntry {
    pub group: Option<SceneGroup>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub scene_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneGroup {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub front_image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneMarker {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub seconds: Option<f64>,
    pub primary_tag: Option<MarkerTag>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerTag {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneFile {
    pub path: Option<String>,
    pub basename: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub height: Option<i64>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub frame_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub bit_rate: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub size: Option<i64>,
}

/// Scene ids arrive as numbers or numeric strings depending on the
/// Stash version; either way the record is useless without one.
fn require_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    lenient_i64(deserializer)?.ok_or_else(|| D::Error::custom("scene id must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_record() {
        let scene: SceneRecord = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(scene.id, 42);
        assert_eq!(scene.title, None);
        assert!(scene.tags.is_empty());
        assert!(scene.files.is_empty());
    }

    #[test]
    fn deserializes_string_scene_id() {
        let scene: SceneRecord = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(scene.id, 42);
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(serde_json::from_str::<SceneRecord>(r#"{"title": "x"}"#).is_err());
    }

    #[test]
    fn deserializes_nested_lists() {
        let scene: SceneRecord = serde_json::from_str(
            r#"{
                "id": 7,
                "tags": [{"id": 1, "name": "tag-a"}],
                "studio": {"id": 3, "name": "Studio", "parent_studio": {"id": 4, "name": "Network"}},
                "performers": [{"id": 9, "name": "Performer", "image_path": "/p/9/image"}],
                "groups": [{"group": {"id": 2, "name": "Group"}, "scene_index": 1}],
                "scene_markers": [{"id": 5, "title": "", "seconds": 12.5, "primary_tag": {"name": "intro"}}],
                "files": [{"path": "/media/a.mp4", "duration": "61.5", "width": 1920, "height": 1080, "frame_rate": 29.97}]
            }"#,
        )
        .unwrap();

        assert_eq!(scene.tags[0].name.as_deref(), Some("tag-a"));
        assert_eq!(
            scene
                .studio
                .as_ref()
                .and_then(|s| s.parent_studio.as_ref())
                .and_then(|p| p.name.as_deref()),
            Some("Network")
        );
        assert_eq!(scene.scene_markers[0].seconds, Some(12.5));
        assert_eq!(scene.files[0].duration, Some(61.5));
        assert_eq!(scene.files[0].frame_rate, Some(29.97));
    }
}
