// Config loading tests - AppConfig::load against files on disk
//
// Environment overrides are process-global, so every test that touches them
// runs serially and restores what it changed.

use fieldline_core::config::{AppConfig, ConfigError, PeerConfig, PeerTransport};
use fieldline_core::domain::PeerId;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

const OVERRIDES: [&str; 6] = [
    "FIELDLINE_FORCE_MOCK_DATA",
    "FIELDLINE_REQUEST_TIMEOUT_MS",
    "FIELDLINE_SCHEDULING_SERVER_PATH",
    "FIELDLINE_ACCOUNTING_SERVER_PATH",
    "FIELDLINE_EMAIL_SERVER_PATH",
    "FIELDLINE_MESSAGING_SERVER_PATH",
];

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("integrations.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

fn clear_overrides() {
    for name in OVERRIDES {
        unsafe { std::env::remove_var(name) };
    }
}

#[test]
#[serial]
fn returns_error_when_file_not_found() {
    clear_overrides();
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/integrations.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
#[serial]
fn returns_parse_error_for_invalid_toml() {
    clear_overrides();
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "force_mock_data = [");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
#[serial]
fn loads_process_and_embedded_peers() {
    clear_overrides();
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
request_timeout_ms = 2500

[rest_server]
bind = "0.0.0.0:9000"
cors_origins = ["https://app.example.com"]

[[peers]]
id = "scheduling"
command = "/opt/fieldline/fieldline-endpoint"
args = ["--peer", "scheduling"]

[[peers]]
id = "email"
mode = "embedded"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("valid config");
    assert_eq!(config.request_timeout, Duration::from_millis(2500));
    assert!(!config.force_mock_data);
    assert_eq!(config.rest_server.bind, "0.0.0.0:9000");
    assert_eq!(config.rest_server.cors_origins, vec!["https://app.example.com"]);

    assert_eq!(config.peers.len(), 2);
    assert_eq!(config.peer(PeerId::Email), Some(&PeerConfig::embedded(PeerId::Email)));
    match &config.peer(PeerId::Scheduling).expect("scheduling").transport {
        PeerTransport::Process(spec) => {
            assert_eq!(spec.command, PathBuf::from("/opt/fieldline/fieldline-endpoint"));
            assert_eq!(spec.args, vec!["--peer", "scheduling"]);
        }
        other => panic!("expected process transport, got {other:?}"),
    }
}

#[test]
#[serial]
fn rejects_unknown_peer_and_missing_command() {
    clear_overrides();
    let dir = tempdir().expect("tempdir");

    let unknown = write_config(dir.path(), "[[peers]]\nid = \"crm\"\nmode = \"embedded\"\n");
    assert!(matches!(
        AppConfig::load(Some(&unknown)),
        Err(ConfigError::UnknownPeer(_))
    ));

    let missing = write_config(dir.path(), "[[peers]]\nid = \"accounting\"\n");
    assert!(matches!(
        AppConfig::load(Some(&missing)),
        Err(ConfigError::MissingCommand { .. })
    ));

    let bad_mode = write_config(dir.path(), "[[peers]]\nid = \"accounting\"\nmode = \"socket\"\n");
    assert!(matches!(
        AppConfig::load(Some(&bad_mode)),
        Err(ConfigError::UnknownMode { .. })
    ));
}

#[test]
#[serial]
fn environment_overrides_file_settings() {
    clear_overrides();
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "force_mock_data = false\nrequest_timeout_ms = 500\n");

    unsafe {
        std::env::set_var("FIELDLINE_FORCE_MOCK_DATA", "yes");
        std::env::set_var("FIELDLINE_REQUEST_TIMEOUT_MS", "750");
        std::env::set_var("FIELDLINE_MESSAGING_SERVER_PATH", "/usr/local/bin/sms-endpoint");
    }
    let config = AppConfig::load(Some(&path));
    clear_overrides();

    let config = config.expect("valid config");
    assert!(config.force_mock_data);
    assert_eq!(config.request_timeout, Duration::from_millis(750));
    assert!(matches!(
        &config.peer(PeerId::Messaging).expect("messaging").transport,
        PeerTransport::Process(spec) if spec.command == PathBuf::from("/usr/local/bin/sms-endpoint")
    ));
}

#[test]
#[serial]
fn invalid_environment_values_are_rejected() {
    clear_overrides();
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "");

    unsafe { std::env::set_var("FIELDLINE_REQUEST_TIMEOUT_MS", "soon") };
    let result = AppConfig::load(Some(&path));
    clear_overrides();

    assert!(matches!(result, Err(ConfigError::InvalidEnv { name, .. }) if name == "FIELDLINE_REQUEST_TIMEOUT_MS"));
}
