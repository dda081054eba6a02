//! Merge file, environment, and CLI configuration into a resolved
//! [`Config`]. Precedence: CLI over environment over file over
//! built-in defaults, except the debug and poster-mode flags, which
//! are enabled when any source enables them.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::sources::{EnvConfig, FileConfig};
use super::{AgentConfig, Config, PlexConfig, ServerConfig, StashConfig};

const DEFAULT_STASH_IP: &str = "127.0.0.1";
const DEFAULT_STASH_PORT: u16 = 9999;
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 7979;
const DEFAULT_CACHE_TTL_SECS: i64 = 300;
const DEFAULT_CONFIG_FILE: &str = "stashex.toml";

/// Values taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and resolve configuration. An explicitly given config path
    /// must exist; the default path is optional.
    pub fn load(cli: CliOverrides) -> anyhow::Result<Config> {
        let file = match &cli.config_path {
            Some(path) => read_file_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    read_file_config(default).context("failed to load stashex.toml")?
                } else {
                    FileConfig::default()
                }
            }
        };

        Ok(resolve(file, EnvConfig::gather(), cli))
    }
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Pure merge of the three sources; separated from I/O so it can be
/// tested without touching the process environment.
pub(crate) fn resolve(file: FileConfig, env: EnvConfig, cli: CliOverrides) -> Config {
    let stash_host = env
        .stash_host
        .or(file.stash.host)
        .unwrap_or_else(|| {
            format!(
                "http://{}:{}",
                file.stash.ip.as_deref().unwrap_or(DEFAULT_STASH_IP),
                file.stash.port.unwrap_or(DEFAULT_STASH_PORT)
            )
        })
        .trim_end_matches('/')
        .to_string();

    let server_host = cli
        .host
        .or(env.server_host)
        .or(file.agent.host)
        .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string());
    let server_port = cli
        .port
        .or(env.server_port)
        .or(file.agent.port)
        .unwrap_or(DEFAULT_SERVER_PORT);

    let base_url = env
        .agent_base_url
        .or(file.agent.base_url)
        .unwrap_or_else(|| derived_base_url(&server_host, server_port))
        .trim_end_matches('/')
        .to_string();

    Config {
        server: ServerConfig {
            host: server_host,
            port: server_port,
        },
        stash: StashConfig {
            host: stash_host,
            api_key: env
                .stash_api_key
                .or(file.stash.api_key)
                .filter(|key| !key.is_empty()),
            cache_ttl_secs: env
                .cache_ttl
                .or(file.stash.cache_ttl)
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        },
        agent: AgentConfig {
            base_url,
            poster_mode: env.poster_mode.unwrap_or(false)
                || file.agent.poster_mode.unwrap_or(false),
        },
        plex: PlexConfig {
            url: env
                .plex_url
                .or(file.plex.url)
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            token: env
                .plex_token
                .or(file.plex.token)
                .filter(|token| !token.is_empty()),
        },
        debug: env.debug.unwrap_or(false) || file.stash.debug.unwrap_or(false),
    }
}

/// Fallback base URL when none is configured. A wildcard listen host
/// is not reachable from Plex, so it maps to loopback.
fn derived_base_url(server_host: &str, server_port: u16) -> String {
    let host = if server_host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        server_host
    };
    format!("http://{host}:{server_port}")
}
