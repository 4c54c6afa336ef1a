pub mod app;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod peer;

pub use crate::constants::CONFIG_PATH;

pub use app::{AppConfig, RestServerConfig};
pub use error::ConfigError;
pub use loader::ensure_env_loaded;
pub use peer::{PeerConfig, PeerTransport, ProcessSpec};
