// Integration client tests - registry lifecycle, invocation, substitution and
// status over embedded peers.

#[path = "../common/mod.rs"]
mod common;

use common::embedded_client;
use fieldline_core::application::cancel::CancelToken;
use fieldline_core::application::client::{ClientConfig, ClientError, EmailQuery, IntegrationClient};
use fieldline_core::application::transport::DefaultTransportFactory;
use fieldline_core::config::PeerConfig;
use fieldline_core::domain::{ConnectionState, PeerId, Provenance};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn initialize_is_idempotent() {
    let client = embedded_client(
        &[Arc::new(common::scheduling()), Arc::new(common::email())],
        TIMEOUT,
    );

    let first = client.initialize().await;
    let second = client.initialize().await;
    assert_eq!(first, second);
    assert_eq!(first.registered, vec![PeerId::Scheduling, PeerId::Email]);
    assert!(first.failed.is_empty());
}

#[tokio::test]
async fn first_call_initializes_lazily() {
    let client = embedded_client(&[Arc::new(common::accounting())], TIMEOUT);
    assert!(client.registered_peers().await.is_empty());

    let outcome = client
        .invoke_or_fallback(PeerId::Accounting, "get_revenue_summary", json!({}), None)
        .await;
    assert_eq!(outcome.provenance, Provenance::Real);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.payload["total_revenue"], 1000);
    assert_eq!(client.registered_peers().await, vec![PeerId::Accounting]);
}

#[tokio::test]
async fn unconfigured_peer_falls_back_with_reason() {
    let client = embedded_client(&[Arc::new(common::scheduling())], TIMEOUT);

    let err = client
        .invoke(PeerId::Messaging, "get_recent_messages", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::PeerUnavailable { peer: PeerId::Messaging, .. }));

    let outcome = client
        .invoke_or_fallback(PeerId::Accounting, "get_outstanding_invoices", json!({}), None)
        .await;
    assert!(outcome.is_mock());
    assert!(outcome.error.is_some());
    assert_eq!(outcome.payload["total_outstanding"], json!(625));
}

#[tokio::test]
async fn tool_error_is_distinguished_from_transport_failure() {
    let client = embedded_client(&[Arc::new(common::email())], TIMEOUT);

    let err = client
        .invoke_payload(PeerId::Email, "archive_email", json!({}), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ToolError { ref tool, .. } if tool == "archive_email"));
}

#[tokio::test(start_paused = true)]
async fn timeout_substitutes_mock_data() {
    let slow = Arc::new(common::accounting().with_delay(Duration::from_secs(30)));
    let client = embedded_client(&[slow], Duration::from_millis(500));

    let outcome = client
        .invoke_or_fallback(PeerId::Accounting, "get_revenue_summary", json!({}), None)
        .await;
    assert!(outcome.is_mock());
    let reason = outcome.error.expect("substitution reason");
    assert!(reason.contains("too long"), "unexpected reason: {reason}");
}

#[tokio::test]
async fn cancelled_token_stops_the_call() {
    let endpoint = Arc::new(common::scheduling());
    let client = embedded_client(&[endpoint.clone()], TIMEOUT);
    client.initialize().await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = client
        .invoke_with(PeerId::Scheduling, "get_jobs", json!({}), Some(&cancel))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled { peer: PeerId::Scheduling }));
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn forced_mock_data_never_touches_peers() {
    let endpoint = Arc::new(common::email());
    let config = ClientConfig::new(vec![PeerConfig::embedded(PeerId::Email)]).with_force_mock_data(true);
    let factory = DefaultTransportFactory::new().with_endpoint(endpoint.clone());
    let client = IntegrationClient::with_factory(config, Arc::new(factory));

    let communications = client.get_emails(&EmailQuery::default(), None).await;
    assert_eq!(communications.source, Provenance::Mock);
    assert_eq!(communications.emails.len(), 5);
    assert_eq!(communications.error, None);
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn status_reports_every_peer_without_initializing() {
    let client = embedded_client(
        &[Arc::new(common::scheduling()), Arc::new(common::messaging())],
        TIMEOUT,
    );

    let before = client.status().await;
    assert_eq!(before.connected_count(), 0);

    client.initialize().await;
    let after = client.status().await;
    assert_eq!(after.connected_count(), 2);
    let scheduling = after.get(PeerId::Scheduling).expect("scheduling");
    assert_eq!(scheduling.status, ConnectionState::Connected);
    assert!(scheduling.last_sync.is_some());
    let email = after.get(PeerId::Email).expect("email");
    assert_eq!(email.status, ConnectionState::Disconnected);
    assert_eq!(email.error, None);
}

#[tokio::test]
async fn disconnect_then_reconnect() {
    let client = embedded_client(
        &[Arc::new(common::scheduling()), Arc::new(common::email())],
        TIMEOUT,
    );
    client.initialize().await;

    let report = client.disconnect().await;
    assert_eq!(report.closed, vec![PeerId::Scheduling, PeerId::Email]);
    assert!(report.failed.is_empty());
    assert!(client.registered_peers().await.is_empty());
    assert_eq!(client.status().await.connected_count(), 0);

    let sent = client
        .send_email("ops@example.com", "Route update", "Running late", None)
        .await
        .expect("email sent");
    assert_eq!(sent["success"], true);
    assert_eq!(client.registered_peers().await.len(), 2);
}
