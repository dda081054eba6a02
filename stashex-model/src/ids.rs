//! Identifier derivation for scenes surfaced through the provider.
//!
//! All three identifiers are pure functions of the Stash scene id, so a
//! scene always maps to the same Plex-visible keys across requests and
//! restarts. The numeric suffix is what the rating-key lookup path
//! extracts to get back to the Stash id.

/// Provider identifier reported in every `MediaContainer` and in the
/// capability document.
pub const PROVIDER_IDENTIFIER: &str = "tv.plex.agents.custom.stash";

/// Opaque rating key issued for a scene, e.g. `stash-video-42`.
pub fn scene_rating_key(scene_id: i64) -> String {
    format!("stash-video-{scene_id}")
}

/// Metadata path for a scene, e.g. `/library/metadata/stash-video-42`.
pub fn scene_metadata_key(scene_id: i64) -> String {
    format!("/library/metadata/stash-video-{scene_id}")
}

/// Stable guid Plex stores against the ingested item,
/// e.g. `plex://movie/stash-video-42`. The upload coordinator matches
/// PMS items by this value.
pub fn scene_guid(scene_id: i64) -> String {
    format!("plex://movie/stash-video-{scene_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_embed_the_scene_id() {
        assert_eq!(scene_rating_key(42), "stash-video-42");
        assert_eq!(scene_metadata_key(42), "/library/metadata/stash-video-42");
        assert_eq!(scene_guid(42), "plex://movie/stash-video-42");
    }

    #[test]
    fn identifiers_are_deterministic() {
        assert_eq!(scene_rating_key(7), scene_rating_key(7));
        assert_eq!(scene_guid(7), scene_guid(7));
    }
}
