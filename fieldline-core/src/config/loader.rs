use super::CONFIG_PATH;
use super::app::{AppConfig, RestServerConfig};
use super::defaults::{DEFAULT_CORS_ORIGINS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_REST_BIND};
use super::error::ConfigError;
use super::peer::{PeerConfig, ProcessSpec, RawPeer, expand};
use crate::constants::{ENV_PATH, ENV_PREFIX};
use crate::domain::PeerId;
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub force_mock_data: Option<bool>,
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub peers: Vec<RawPeer>,
    pub rest_server: Option<RawRestServer>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawRestServer {
    pub bind: Option<String>,
    pub cors_origins: Option<Vec<String>>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. Without one, the default file is optional and
/// the environment alone can describe every peer.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let parsed = match path {
        Some(path) => read_config(path)?,
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                debug!(path = CONFIG_PATH, "No integration config file, using environment only");
                RawConfig::default()
            }
        }
    };
    validate_and_build(parsed, |name| std::env::var(name).ok())
}

fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    debug!(path = %path.display(), "Reading integration configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// File settings first, then environment overrides from `lookup`.
pub(super) fn validate_and_build<F>(parsed: RawConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut peers: BTreeMap<PeerId, PeerConfig> = BTreeMap::new();
    let mut seen = Vec::new();
    for raw in parsed.peers {
        let peer: PeerId = raw.id.parse()?;
        if seen.contains(&peer) {
            return Err(ConfigError::DuplicatePeer {
                peer: peer.to_string(),
            });
        }
        seen.push(peer);
        if !raw.enabled {
            debug!(%peer, "Peer disabled in configuration");
            continue;
        }
        peers.insert(peer, PeerConfig::try_from(raw)?);
    }

    for peer in PeerId::ALL {
        if seen.contains(&peer) {
            continue;
        }
        let name = peer.server_path_env();
        if let Some(path) = lookup(&name).filter(|value| !value.trim().is_empty()) {
            debug!(%peer, env = name.as_str(), "Peer configured from environment");
            peers.insert(
                peer,
                PeerConfig::process(peer, ProcessSpec::new(expand(path.trim()))),
            );
        }
    }

    let force_env = format!("{ENV_PREFIX}_FORCE_MOCK_DATA");
    let force_mock_data = match lookup(&force_env) {
        Some(value) => parse_flag(&force_env, &value)?,
        None => parsed.force_mock_data.unwrap_or(false),
    };

    let timeout_env = format!("{ENV_PREFIX}_REQUEST_TIMEOUT_MS");
    let timeout_ms = match lookup(&timeout_env) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidEnv {
                name: timeout_env.clone(),
                value: value.clone(),
            })?,
        None => parsed
            .request_timeout_ms
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
    };
    if timeout_ms == 0 {
        return Err(ConfigError::InvalidTimeout);
    }

    let rest = parsed.rest_server.unwrap_or_default();
    Ok(AppConfig {
        peers: peers.into_values().collect(),
        force_mock_data,
        request_timeout: Duration::from_millis(timeout_ms),
        rest_server: RestServerConfig {
            bind: rest.bind.unwrap_or_else(|| DEFAULT_REST_BIND.to_string()),
            cors_origins: rest.cors_origins.unwrap_or_else(|| {
                DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
            }),
        },
    })
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
