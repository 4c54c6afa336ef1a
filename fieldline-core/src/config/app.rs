use super::error::ConfigError;
use super::peer::PeerConfig;
use crate::domain::PeerId;
use std::path::Path;
use std::time::Duration;

/// Integration configuration loaded from integrations.toml and the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Enabled peers, at most one entry per [`PeerId`]
    pub peers: Vec<PeerConfig>,
    /// Serve substituted data without touching any transport
    pub force_mock_data: bool,
    /// Upper bound for every transport request
    pub request_timeout: Duration,
    pub rest_server: RestServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestServerConfig {
    pub bind: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    pub fn peer(&self, peer: PeerId) -> Option<&PeerConfig> {
        self.peers.iter().find(|config| config.peer == peer)
    }
}
