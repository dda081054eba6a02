//! Lenient numeric deserialization for backend wire values.
//!
//! Stash reports some numeric scene fields as JSON numbers and others as
//! strings depending on version and field. The translator treats every
//! unparseable value as absent, so the deserializers here fold string,
//! number, and garbage inputs into `Option` instead of failing the whole
//! scene record.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Deserialize an optional integer from a number or numeric string.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<MaybeNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        MaybeNumber::Int(n) => Some(n),
        MaybeNumber::Float(f) if f.fract() == 0.0 => Some(f as i64),
        MaybeNumber::Float(_) => None,
        MaybeNumber::Text(s) => s.trim().parse().ok(),
        MaybeNumber::Other(_) => None,
    }))
}

/// Deserialize an optional float from a number or numeric string.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<MaybeNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        MaybeNumber::Int(n) => Some(n as f64),
        MaybeNumber::Float(f) => Some(f),
        MaybeNumber::Text(s) => s.trim().parse().ok(),
        MaybeNumber::Other(_) => None,
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::lenient_i64")]
        int: Option<i64>,
        #[serde(default, deserialize_with = "super::lenient_f64")]
        float: Option<f64>,
    }

    #[test]
    fn accepts_plain_numbers() {
        let probe: Probe = serde_json::from_str(r#"{"int": 85, "float": 29.97}"#).unwrap();
        assert_eq!(probe.int, Some(85));
        assert_eq!(probe.float, Some(29.97));
    }

    #[test]
    fn accepts_numeric_strings() {
        let probe: Probe = serde_json::from_str(r#"{"int": "85", "float": "29.97"}"#).unwrap();
        assert_eq!(probe.int, Some(85));
        assert_eq!(probe.float, Some(29.97));
    }

    #[test]
    fn garbage_maps_to_none_instead_of_erroring() {
        let probe: Probe =
            serde_json::from_str(r#"{"int": "eighty-five", "float": {"nested": true}}"#).unwrap();
        assert_eq!(probe.int, None);
        assert_eq!(probe.float, None);
    }

    #[test]
    fn null_and_missing_map_to_none() {
        let probe: Probe = serde_json::from_str(r#"{"int": null}"#).unwrap();
        assert_eq!(probe.int, None);
        assert_eq!(probe.float, None);
    }
}
