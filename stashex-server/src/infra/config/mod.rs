//! Layered configuration: TOML file values overridden by environment
//! variables, overridden by CLI flags.

pub mod loader;
pub mod sources;

pub use loader::{CliOverrides, ConfigLoader};
pub use sources::{EnvConfig, FileConfig};

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub stash: StashConfig,
    pub agent: AgentConfig,
    pub plex: PlexConfig,
    pub debug: bool,
}

/// Listen address of this service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StashConfig {
    /// Base URL of the Stash instance.
    pub host: String,
    /// Sent as the `ApiKey` header when Stash has authentication on.
    pub api_key: Option<String>,
    /// Response cache TTL in seconds; zero or negative disables.
    pub cache_ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Externally reachable base URL of this service, embedded in the
    /// artwork links handed to Plex.
    pub base_url: String,
    /// Serve 2:3 letterboxed posters instead of raw screenshots.
    pub poster_mode: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlexConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        if self.stash.cache_ttl_secs <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(self.stash.cache_ttl_secs as u64)
        }
    }

    /// PMS url and token, present only when direct poster upload is
    /// enabled: poster mode on and both connection values set.
    pub fn upload_settings(&self) -> Option<(&str, &str)> {
        if !self.agent.poster_mode {
            return None;
        }
        match (self.plex.url.as_deref(), self.plex.token.as_deref()) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload_settings().is_some()
    }
}
