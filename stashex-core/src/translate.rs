//! Projection from Stash scene records to Plex metadata items.
//!
//! The translation is a pure function of the scene record plus the
//! service's own base URL and poster-mode flag. Missing or unparseable
//! input never fails a translation; the affected output field is simply
//! omitted. Artwork links always point back at this service's proxy
//! endpoints so Plex can fetch them without reaching the Stash host.

use stashex_model::{
    ChapterEntry, MediaContainer, MediaEntry, MetadataItem, PartEntry, SceneFile, SceneMarker,
    ScenePerformer, SceneRecord, SceneStudio, TagEntry, scene_guid, scene_metadata_key,
    scene_rating_key,
};

/// Inputs to the translation beyond the scene itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Externally reachable base URL of this service; embedded in the
    /// art/thumb links handed to Plex.
    pub base_url: String,
    /// Stash host, used for performer thumb links only.
    pub stash_host: String,
    /// When set, art/thumb point at the letterboxed poster endpoint
    /// instead of the raw screenshot proxy.
    pub poster_mode: bool,
}

/// Translate a full query result. `None` means "no match" and is
/// distinct from a matched, empty container; callers surface a miss as
/// an empty envelope at the protocol boundary.
pub fn translate_scenes(
    scenes: Vec<SceneRecord>,
    options: &TranslateOptions,
) -> Option<MediaContainer> {
    if scenes.is_empty() {
        return None;
    }
    let items = scenes
        .iter()
        .map(|scene| translate_scene(scene, options))
        .collect();
    Some(MediaContainer::with_items(items))
}

/// Translate a single scene. Pure and deterministic: equal inputs
/// always produce equal items.
pub fn translate_scene(scene: &SceneRecord, options: &TranslateOptions) -> MetadataItem {
    let artwork = artwork_url(scene.id, options);

    let title = scene
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| scene.code.as_deref().filter(|c| !c.is_empty()))
        .unwrap_or("")
        .to_string();

    // Production code becomes the tagline when it adds information.
    let tagline = scene
        .code
        .as_deref()
        .filter(|code| !code.is_empty() && *code != title)
        .map(str::to_string);

    let directors = scene
        .director
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| vec![TagEntry::new(d)]);

    let genres = non_empty(
        scene
            .tags
            .iter()
            .filter_map(|tag| tag.name.as_deref())
            .filter(|name| !name.is_empty())
            .map(TagEntry::new)
            .collect(),
    );

    let roles = non_empty(
        scene
            .performers
            .iter()
            .filter_map(|performer| performer_role(performer, options))
            .collect(),
    );

    let collections = non_empty(
        scene
            .groups
            .iter()
            .filter_map(|entry| entry.group.as_ref())
            .filter_map(|group| group.name.as_deref())
            .filter(|name| !name.is_empty())
            .map(TagEntry::new)
            .collect(),
    );

    let chapters = non_empty(chapters_from_markers(&scene.scene_markers));

    let media = scene.files.first().and_then(media_from_file);
    let duration = media.as_ref().and_then(|entry| entry.duration);

    MetadataItem {
        guid: scene_guid(scene.id),
        key: scene_metadata_key(scene.id),
        rating_key: scene_rating_key(scene.id),
        media_type: "movie".to_string(),
        title,
        summary: scene.details.clone().unwrap_or_default(),
        art: artwork.clone(),
        thumb: artwork,
        originally_available_at: scene.date.clone(),
        tagline,
        year: scene.date.as_deref().and_then(parse_year),
        added_at: scene.created_at.as_deref().and_then(parse_added_at),
        studio: scene.studio.as_ref().map(studio_display_name),
        rating: scene.rating100.map(scale_rating),
        duration,
        director: directors,
        genres,
        roles,
        collections,
        chapters,
        media: media.map(|entry| vec![entry]),
    }
}

fn artwork_url(scene_id: i64, options: &TranslateOptions) -> String {
    if options.poster_mode {
        format!("{}/stash/scene/{}/poster", options.base_url, scene_id)
    } else {
        format!("{}/stash/scene/{}/screenshot", options.base_url, scene_id)
    }
}

fn non_empty<T>(entries: Vec<T>) -> Option<Vec<T>> {
    if entries.is_empty() { None } else { Some(entries) }
}

fn performer_role(performer: &ScenePerformer, options: &TranslateOptions) -> Option<TagEntry> {
    let name = performer.name.as_deref().filter(|name| !name.is_empty())?;
    Some(TagEntry {
        tag: name.to_string(),
        thumb: performer
            .id
            .map(|id| format!("{}/performer/{}/image", options.stash_host, id)),
    })
}

/// `"<studio> (<parent>)"` when a parent studio exists with a
/// different, non-empty name; otherwise just the studio name.
fn studio_display_name(studio: &SceneStudio) -> String {
    let name = studio.name.as_deref().unwrap_or("");
    if let Some(parent_name) = studio
        .parent_studio
        .as_ref()
        .and_then(|parent| parent.name.as_deref())
        && !parent_name.is_empty()
        && parent_name != name
    {
        return format!("{name} ({parent_name})");
    }
    name.to_string()
}

/// Year from the first four characters of the release date. Shorter or
/// non-numeric input is silently absorbed.
fn parse_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}

/// Epoch seconds from the backend creation timestamp. Accepts RFC 3339
/// and offset-less ISO date-times; anything else is absorbed.
fn parse_added_at(created_at: &str) -> Option<i64> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(created_at) {
        return Some(parsed.timestamp());
    }
    chrono::NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

/// Stash rates 0-100; Plex expects 0-10 with one decimal.
fn scale_rating(rating100: i64) -> f64 {
    (rating100 as f64 / 10.0 * 10.0).round() / 10.0
}

/// Markers become chapters sorted ascending by offset. A marker with no
/// title of its own borrows its primary tag's name.
fn chapters_from_markers(markers: &[SceneMarker]) -> Vec<ChapterEntry> {
    let mut sorted: Vec<&SceneMarker> = markers.iter().collect();
    sorted.sort_by(|a, b| {
        let a = a.seconds.unwrap_or(0.0);
        let b = b.seconds.unwrap_or(0.0);
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    });

    sorted
        .iter()
        .enumerate()
        .map(|(position, marker)| {
            let tag = marker
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .or_else(|| {
                    marker
                        .primary_tag
                        .as_ref()
                        .and_then(|primary| primary.name.as_deref())
                })
                .unwrap_or("")
                .to_string();
            ChapterEntry {
                tag,
                index: position as u32 + 1,
                start_time_offset: (marker.seconds.unwrap_or(0.0) * 1000.0) as i64,
            }
        })
        .collect()
}

/// Media info is derived from the first file only; additional files are
/// ignored. A file contributing nothing yields no Media list at all.
fn media_from_file(file: &SceneFile) -> Option<MediaEntry> {
    let width = file.width.filter(|&w| w != 0);
    let height = file.height.filter(|&h| h != 0);

    let part = PartEntry {
        file: file.path.clone().filter(|path| !path.is_empty()),
        size: file.size.filter(|&s| s != 0),
    };
    let parts = (part.file.is_some() || part.size.is_some()).then(|| vec![part]);

    let entry = MediaEntry {
        duration: file.duration.map(|seconds| (seconds * 1000.0) as i64),
        width,
        height,
        video_codec: file.video_codec.clone().filter(|codec| !codec.is_empty()),
        audio_codec: file.audio_codec.clone().filter(|codec| !codec.is_empty()),
        bitrate: file.bit_rate.filter(|&rate| rate != 0),
        video_frame_rate: file
            .frame_rate
            .filter(|&rate| rate != 0.0)
            .map(frame_rate_label),
        video_resolution: height.map(resolution_label).map(str::to_string),
        parts,
    };

    (entry != MediaEntry::default()).then_some(entry)
}

/// Frame-rate anchors checked in ascending order; the first anchor
/// within half a frame wins, so a rate equidistant from two anchors
/// lands in the lower bucket.
const FRAME_RATE_ANCHORS: &[(f64, &str)] = &[
    (23.976, "24p"),
    (24.0, "24p"),
    (25.0, "PAL"),
    (29.97, "NTSC"),
    (30.0, "30p"),
    (50.0, "50p"),
    (59.94, "60p"),
    (60.0, "60p"),
];

fn frame_rate_label(rate: f64) -> String {
    for (anchor, label) in FRAME_RATE_ANCHORS {
        if (rate - anchor).abs() <= 0.5 {
            return (*label).to_string();
        }
    }
    format!("{}p", rate.floor() as i64)
}

fn resolution_label(height: i64) -> &'static str {
    if height >= 2160 {
        "4k"
    } else if height >= 1080 {
        "1080"
    } else if height >= 720 {
        "720"
    } else if height >= 480 {
        "480"
    } else {
        "sd"
    }
}
