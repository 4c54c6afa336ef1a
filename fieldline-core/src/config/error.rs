use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    UnknownPeer(#[from] crate::domain::UnknownPeer),

    #[error("peer '{peer}' is configured more than once")]
    DuplicatePeer { peer: String },

    #[error("peer '{peer}' uses process mode but has no 'command'")]
    MissingCommand { peer: String },

    #[error("peer '{peer}' has unknown mode '{mode}' (expected process or embedded)")]
    UnknownMode { peer: String, mode: String },

    #[error("request_timeout_ms must be greater than zero")]
    InvalidTimeout,

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: String, value: String },
}
