//! Application constants
//!
//! Single source of truth for paths and protocol constants.

/// Default integration configuration file path
pub const CONFIG_PATH: &str = "config/integrations.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Configuration directory
pub const CONFIG_DIR: &str = "config";

/// Protocol version announced during the endpoint handshake
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Prefix shared by every environment override read by the loader
pub const ENV_PREFIX: &str = "FIELDLINE";

/// Gmail-style query used for the "recent communications" fetch
pub const RECENT_EMAIL_QUERY: &str = "is:unread OR newer_than:1d";
