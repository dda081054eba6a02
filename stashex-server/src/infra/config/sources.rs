//! Raw configuration sources prior to merging.

use serde::Deserialize;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub stash: FileStashConfig,
    #[serde(default)]
    pub agent: FileAgentConfig,
    #[serde(default)]
    pub plex: FilePlexConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileStashConfig {
    /// Full base URL; takes precedence over `ip`/`port`.
    pub host: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub debug: Option<bool>,
    pub cache_ttl: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileAgentConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    pub poster_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilePlexConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub stash_host: Option<String>,
    pub stash_api_key: Option<String>,
    pub debug: Option<bool>,
    pub cache_ttl: Option<i64>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub agent_base_url: Option<String>,
    pub poster_mode: Option<bool>,
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            stash_host: std::env::var("STASH_HOST").ok(),
            stash_api_key: std::env::var("STASH_API_KEY").ok(),
            debug: parse_bool_var("DEBUG"),
            cache_ttl: std::env::var("CACHE_TTL")
                .ok()
                .and_then(|s| s.parse().ok()),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            agent_base_url: std::env::var("AGENT_BASE_URL").ok(),
            poster_mode: parse_bool_var("POSTER_MODE"),
            plex_url: std::env::var("PLEX_URL").ok(),
            plex_token: std::env::var("PLEX_TOKEN").ok(),
        }
    }
}

/// Parse a boolean value from a raw string, accepting common env-style forms.
///
/// Accepted truthy values (case-insensitive): `"1"`, `"true"`, `"yes"`, `"on"`.
/// Accepted falsy values: `"0"`, `"false"`, `"no"`, `"off"`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|raw| parse_bool(&raw))
}
