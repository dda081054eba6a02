//! Scene filters and the Stash GraphQL queries built from them.
//!
//! Filter values are interpolated into a textual GraphQL document, so
//! filename input is escaped just enough that it cannot terminate the
//! enclosing string literal or smuggle in extra query clauses. Rating
//! keys carry the scene id as a trailing `-<digits>` suffix; a key
//! without one matches nothing and produces no query at all.

use std::sync::LazyLock;

use regex::Regex;

static RATING_KEY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)$").expect("rating key suffix pattern must compile"));

/// A typed lookup filter, one per inbound match path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneFilter {
    /// Case-sensitive substring match against scene file paths.
    Filename(String),
    /// Exact scene id extracted from an opaque rating key.
    RatingKey(String),
}

impl SceneFilter {
    /// Render the filter into a `scene_filter` clause, or `None` when
    /// the filter cannot match anything (empty filename, rating key
    /// without a numeric suffix). The clause doubles as the cache
    /// fingerprint for the lookup.
    pub fn filter_clause(&self) -> Option<String> {
        match self {
            SceneFilter::Filename(filename) => {
                if filename.is_empty() {
                    return None;
                }
                let safe = escape_graphql_string(filename);
                Some(format!(
                    r#"path: {{value: "\"{safe}\"", modifier: INCLUDES}}"#
                ))
            }
            SceneFilter::RatingKey(rating_key) => {
                let id = rating_key_scene_id(rating_key)?;
                Some(format!("id: {{value: {id}, modifier: EQUALS}}"))
            }
        }
    }
}

/// Extract the scene id digits from the trailing `-<digits>` suffix of
/// a rating key. `None` is a no-match condition, not an error.
pub fn rating_key_scene_id(rating_key: &str) -> Option<&str> {
    RATING_KEY_SUFFIX
        .captures(rating_key)
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str())
}

/// Escape characters that could break a GraphQL string literal.
pub fn escape_graphql_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Full `findScenes` query for a rendered filter clause, requesting the
/// complete scene projection the translator consumes.
pub fn scene_query(filter_clause: &str) -> String {
    format!(
        r#"query {{
  findScenes(scene_filter: {{ {filter_clause} }}) {{
    scenes {{
      id
      code
      title
      date
      urls
      rating100
      details
      director
      created_at
      tags {{ id name }}
      studio {{ id name image_path parent_studio {{ id name }} }}
      performers {{ id name image_path }}
      groups {{ group {{ id name front_image_path }} scene_index }}
      scene_markers {{ id title seconds primary_tag {{ name }} }}
      files {{ path basename duration width height video_codec audio_codec frame_rate bit_rate size }}
    }}
  }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_filter_wraps_value_as_quoted_substring() {
        let clause = SceneFilter::Filename("clip_01.mp4".into())
            .filter_clause()
            .unwrap();
        assert_eq!(
            clause,
            r#"path: {value: "\"clip_01.mp4\"", modifier: INCLUDES}"#
        );
    }

    #[test]
    fn filename_filter_escapes_literal_breakers() {
        let clause = SceneFilter::Filename("a\"b\\c\nd\re.mp4".into())
            .filter_clause()
            .unwrap();
        assert!(clause.contains(r#"a\"b\\c\nd\re.mp4"#));
        // The rendered clause must not contain a raw newline or return.
        assert!(!clause.contains('\n'));
        assert!(!clause.contains('\r'));
    }

    #[test]
    fn empty_filename_produces_no_query() {
        assert_eq!(SceneFilter::Filename(String::new()).filter_clause(), None);
    }

    #[test]
    fn rating_key_filter_extracts_trailing_digits() {
        let clause = SceneFilter::RatingKey("stash-video-42".into())
            .filter_clause()
            .unwrap();
        assert_eq!(clause, "id: {value: 42, modifier: EQUALS}");
    }

    #[test]
    fn rating_key_without_suffix_produces_no_query() {
        assert_eq!(SceneFilter::RatingKey("not-a-video".into()).filter_clause(), None);
        assert_eq!(SceneFilter::RatingKey("stash-video-".into()).filter_clause(), None);
        assert_eq!(SceneFilter::RatingKey("42-stash".into()).filter_clause(), None);
    }

    #[test]
    fn rating_key_digits_must_be_terminal() {
        assert_eq!(rating_key_scene_id("stash-video-42"), Some("42"));
        assert_eq!(rating_key_scene_id("stash-video-42x"), None);
        assert_eq!(rating_key_scene_id(""), None);
    }

    #[test]
    fn scene_query_embeds_clause_and_projection() {
        let query = scene_query("id: {value: 7, modifier: EQUALS}");
        assert!(query.contains("findScenes(scene_filter: { id: {value: 7, modifier: EQUALS} })"));
        assert!(query.contains("scene_markers { id title seconds primary_tag { name } }"));
        assert!(query.contains("files { path basename duration width height"));
    }
}
