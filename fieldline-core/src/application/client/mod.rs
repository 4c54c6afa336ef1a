//! # Integration client
//!
//! Registry of live transports, one per configured peer. The client is an
//! ordinary value: build it once from configuration and share it (usually
//! behind an `Arc`) with whatever needs to call a peer.
//!
//! Sessions are established by [`IntegrationClient::initialize`], which is
//! idempotent and is also run lazily by the first call. They stay up until
//! [`IntegrationClient::disconnect`]. Peers that are not configured, or whose
//! transport failed to connect, are simply absent from the registry; calls to
//! them fail with [`ClientError::PeerUnavailable`] and the `*_or_fallback`
//! family substitutes mock data instead.

mod error;
pub mod query;

pub use error::ClientError;
pub use query::{Communications, CustomerOverview, EmailQuery, FinancialSummary};

use super::cancel::CancelToken;
use super::fallback;
use super::transport::{CallOptions, DefaultTransportFactory, Transport, TransportFactory};
use crate::config::{AppConfig, PeerConfig, defaults};
use crate::domain::{
    IntegrationStatus, ParseFailure, PeerId, PeerStatus, Provenance, ToolDescriptor, ToolResult,
};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub peers: Vec<PeerConfig>,
    pub force_mock_data: bool,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(peers: Vec<PeerConfig>) -> Self {
        Self {
            peers,
            force_mock_data: false,
            request_timeout: defaults::request_timeout(),
        }
    }

    pub fn with_force_mock_data(mut self, force: bool) -> Self {
        self.force_mock_data = force;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            peers: config.peers.clone(),
            force_mock_data: config.force_mock_data,
            request_timeout: config.request_timeout,
        }
    }
}

/// A tool payload together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ToolOutcome {
    pub peer: PeerId,
    pub tool: String,
    #[schema(value_type = Object)]
    pub payload: Value,
    pub provenance: Provenance,
    /// Why the live call was replaced, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    fn live(peer: PeerId, tool: &str, payload: Value) -> Self {
        Self {
            peer,
            tool: tool.to_string(),
            provenance: Provenance::detect(&payload),
            payload,
            error: None,
        }
    }

    fn substituted(peer: PeerId, tool: &str, payload: Value, error: Option<String>) -> Self {
        Self {
            peer,
            tool: tool.to_string(),
            payload,
            provenance: Provenance::Mock,
            error,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.provenance == Provenance::Mock
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InitSummary {
    pub registered: Vec<PeerId>,
    #[schema(value_type = Object)]
    pub failed: BTreeMap<PeerId, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DisconnectReport {
    pub closed: Vec<PeerId>,
    #[schema(value_type = Object)]
    pub failed: BTreeMap<PeerId, String>,
}

pub struct IntegrationClient {
    config: ClientConfig,
    factory: Arc<dyn TransportFactory>,
    registry: RwLock<HashMap<PeerId, Arc<dyn Transport>>>,
    failures: RwLock<HashMap<PeerId, String>>,
    /// Held across initialize and disconnect; `true` once initialized.
    lifecycle: Mutex<bool>,
}

impl IntegrationClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_factory(config, Arc::new(DefaultTransportFactory::new()))
    }

    pub fn with_factory(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            config,
            factory,
            registry: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            lifecycle: Mutex::new(false),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn force_mock_data(&self) -> bool {
        self.config.force_mock_data
    }

    pub async fn registered_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.registry.read().await.keys().copied().collect();
        peers.sort();
        peers
    }

    pub(crate) fn call_options(&self, cancel: Option<&CancelToken>) -> CallOptions {
        let options = CallOptions::new(self.config.request_timeout);
        match cancel {
            Some(token) => options.with_cancel(token.clone()),
            None => options,
        }
    }

    /// Connects every configured peer. Calling it again is a no-op until
    /// [`disconnect`](Self::disconnect).
    pub async fn initialize(&self) -> InitSummary {
        let mut initialized = self.lifecycle.lock().await;
        if *initialized {
            return self.summary().await;
        }

        let options = self.call_options(None);
        let options = &options;
        let attempts = self.config.peers.iter().map(|peer_config| async move {
            let transport = self.factory.create(peer_config);
            let result = transport.connect(options).await;
            (peer_config.peer, transport, result)
        });

        let mut registry = self.registry.write().await;
        let mut failures = self.failures.write().await;
        for (peer, transport, result) in join_all(attempts).await {
            match result {
                Ok(()) => {
                    debug!(%peer, "Peer registered");
                    registry.insert(peer, transport);
                    failures.remove(&peer);
                }
                Err(err) => {
                    warn!(%peer, %err, "Failed to connect peer, calls will use mock data");
                    failures.insert(peer, err.to_string());
                }
            }
        }
        drop(failures);
        drop(registry);

        *initialized = true;
        let summary = self.summary().await;
        info!(
            registered = summary.registered.len(),
            failed = summary.failed.len(),
            "Integration client initialized"
        );
        summary
    }

    async fn summary(&self) -> InitSummary {
        InitSummary {
            registered: self.registered_peers().await,
            failed: self
                .failures
                .read()
                .await
                .iter()
                .map(|(peer, reason)| (*peer, reason.clone()))
                .collect(),
        }
    }

    async fn ensure_initialized(&self) {
        let initialized = *self.lifecycle.lock().await;
        if !initialized {
            self.initialize().await;
        }
    }

    async fn transport(&self, peer: PeerId) -> Result<Arc<dyn Transport>, ClientError> {
        self.ensure_initialized().await;
        let registry = self.registry.read().await;
        match registry.get(&peer) {
            Some(transport) if transport.is_connected() => Ok(Arc::clone(transport)),
            Some(_) => Err(ClientError::PeerUnavailable {
                peer,
                reason: "transport disconnected".to_string(),
            }),
            None => {
                let reason = self
                    .failures
                    .read()
                    .await
                    .get(&peer)
                    .cloned()
                    .unwrap_or_else(|| "not configured".to_string());
                Err(ClientError::PeerUnavailable { peer, reason })
            }
        }
    }

    pub async fn invoke(
        &self,
        peer: PeerId,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolResult, ClientError> {
        self.invoke_with(peer, tool, arguments, None).await
    }

    /// `tools/call` on `peer`, bounded by the configured timeout and `cancel`.
    pub async fn invoke_with(
        &self,
        peer: PeerId,
        tool: &str,
        arguments: Value,
        cancel: Option<&CancelToken>,
    ) -> Result<ToolResult, ClientError> {
        let transport = self.transport(peer).await?;
        let options = self.call_options(cancel);
        let params = json!({ "name": tool, "arguments": arguments });

        let raw = transport
            .request("tools/call", params, &options)
            .await
            .map_err(|err| {
                warn!(%peer, tool, %err, "Tool call failed at the transport");
                ClientError::from(err)
            })?;
        serde_json::from_value(raw).map_err(|err| ClientError::Parse {
            peer,
            tool: tool.to_string(),
            reason: err.to_string(),
        })
    }

    /// Like [`invoke_with`](Self::invoke_with), unwrapped to the JSON payload.
    /// Error results and unparseable text are both failures.
    pub async fn invoke_payload(
        &self,
        peer: PeerId,
        tool: &str,
        arguments: Value,
        cancel: Option<&CancelToken>,
    ) -> Result<Value, ClientError> {
        let result = self.invoke_with(peer, tool, arguments, cancel).await?;
        result.payload().map_err(|failure| match failure {
            ParseFailure::ToolError(message) => ClientError::ToolError {
                peer,
                tool: tool.to_string(),
                message,
            },
            other => ClientError::Parse {
                peer,
                tool: tool.to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// Never fails: any problem with the live call yields the mock payload
    /// the peer's endpoint would have served.
    pub async fn invoke_or_fallback(
        &self,
        peer: PeerId,
        tool: &str,
        arguments: Value,
        cancel: Option<&CancelToken>,
    ) -> ToolOutcome {
        if self.config.force_mock_data {
            debug!(%peer, tool, "Mock data forced by configuration");
            let payload = fallback::mock_payload(peer, tool, &arguments, "mock data forced by configuration");
            return ToolOutcome::substituted(peer, tool, payload, None);
        }

        match self
            .invoke_payload(peer, tool, arguments.clone(), cancel)
            .await
        {
            Ok(payload) => ToolOutcome::live(peer, tool, payload),
            Err(err) => {
                warn!(%peer, tool, %err, "Substituting mock data for failed call");
                let payload = fallback::mock_payload(peer, tool, &arguments, &err.to_string());
                ToolOutcome::substituted(peer, tool, payload, Some(err.user_message()))
            }
        }
    }

    /// Catalog cached at handshake, or a fresh `tools/list` if it was empty.
    pub async fn list_tools(&self, peer: PeerId) -> Result<Vec<ToolDescriptor>, ClientError> {
        let transport = self.transport(peer).await?;
        let cached = transport.tools().await;
        if !cached.is_empty() {
            return Ok(cached);
        }
        let result = transport
            .request("tools/list", json!({}), &self.call_options(None))
            .await?;
        Ok(crate::application::transport::parse_catalog(&result))
    }

    /// Pings every registered peer. Does not initialize.
    pub async fn status(&self) -> IntegrationStatus {
        let registry = self.registry.read().await.clone();
        let failures = self.failures.read().await.clone();
        let options = self.call_options(None);
        let options = &options;

        let probes = PeerId::ALL.map(|peer| {
            let transport = registry.get(&peer).cloned();
            let failure = failures.get(&peer).cloned();
            async move {
                let status = match transport {
                    Some(transport) => match transport.request("ping", json!({}), options).await {
                        Ok(_) => PeerStatus::connected(Utc::now()),
                        Err(err) => PeerStatus::failed(err.to_string()),
                    },
                    None => PeerStatus::disconnected(failure),
                };
                (peer, status)
            }
        });

        IntegrationStatus::new(join_all(probes).await.into_iter().collect())
    }

    /// Closes every transport best-effort and forgets all sessions.
    pub async fn disconnect(&self) -> DisconnectReport {
        let mut initialized = self.lifecycle.lock().await;
        let sessions: Vec<(PeerId, Arc<dyn Transport>)> =
            self.registry.write().await.drain().collect();
        self.failures.write().await.clear();

        let closing = sessions
            .into_iter()
            .map(|(peer, transport)| async move { (peer, transport.close().await) });

        let mut report = DisconnectReport::default();
        for (peer, result) in join_all(closing).await {
            match result {
                Ok(()) => report.closed.push(peer),
                Err(err) => {
                    warn!(%peer, %err, "Error closing peer transport");
                    report.failed.insert(peer, err.to_string());
                }
            }
        }
        report.closed.sort();
        *initialized = false;
        info!(closed = report.closed.len(), "Integration client disconnected");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::endpoint::ToolEndpoint;
    use crate::application::transport::TransportError;
    use crate::domain::ConnectionState;
    use crate::infrastructure::endpoints::{EmailEndpoint, SchedulingEndpoint};
    use crate::infrastructure::upstream::testing::ScriptedUpstream;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFactory {
        inner: DefaultTransportFactory,
        created: AtomicUsize,
    }

    impl TransportFactory for CountingFactory {
        fn create(&self, config: &PeerConfig) -> Arc<dyn Transport> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.inner.create(config)
        }
    }

    /// Delegates to the wrapped transport but refuses to close.
    struct StuckTransport(Arc<dyn Transport>);

    #[async_trait::async_trait]
    impl Transport for StuckTransport {
        fn peer(&self) -> PeerId {
            self.0.peer()
        }

        async fn connect(&self, options: &CallOptions) -> Result<(), TransportError> {
            self.0.connect(options).await
        }

        async fn request(
            &self,
            method: &str,
            params: Value,
            options: &CallOptions,
        ) -> Result<Value, TransportError> {
            self.0.request(method, params, options).await
        }

        async fn close(&self) -> Result<(), TransportError> {
            Err(TransportError::Transport {
                peer: self.0.peer(),
                message: "stdin already closed".to_string(),
            })
        }

        fn is_connected(&self) -> bool {
            self.0.is_connected()
        }

        async fn tools(&self) -> Vec<ToolDescriptor> {
            self.0.tools().await
        }
    }

    struct StuckCloseFactory {
        inner: DefaultTransportFactory,
        stuck: PeerId,
    }

    impl TransportFactory for StuckCloseFactory {
        fn create(&self, config: &PeerConfig) -> Arc<dyn Transport> {
            let transport = self.inner.create(config);
            if config.peer == self.stuck {
                Arc::new(StuckTransport(transport))
            } else {
                transport
            }
        }
    }

    fn offline_endpoints() -> DefaultTransportFactory {
        let scheduling: Arc<dyn ToolEndpoint> =
            Arc::new(SchedulingEndpoint::new(Arc::new(ScriptedUpstream::offline())));
        let email: Arc<dyn ToolEndpoint> =
            Arc::new(EmailEndpoint::new(Arc::new(ScriptedUpstream::offline())));
        DefaultTransportFactory::new()
            .with_endpoint(scheduling)
            .with_endpoint(email)
    }

    fn client(peers: &[PeerId], force_mock: bool) -> (IntegrationClient, Arc<CountingFactory>) {
        let factory = Arc::new(CountingFactory {
            inner: offline_endpoints(),
            created: AtomicUsize::new(0),
        });
        let config = ClientConfig::new(peers.iter().copied().map(PeerConfig::embedded).collect())
            .with_force_mock_data(force_mock);
        let client = IntegrationClient::with_factory(config, factory.clone());
        (client, factory)
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (client, factory) = client(&[PeerId::Scheduling, PeerId::Email], false);
        let first = client.initialize().await;
        let second = client.initialize().await;
        assert_eq!(first.registered, vec![PeerId::Scheduling, PeerId::Email]);
        assert_eq!(first, second);
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unconfigured_peer_is_unavailable_and_falls_back() {
        let (client, _) = client(&[PeerId::Email], false);
        let err = client
            .invoke(PeerId::Scheduling, "get_jobs", json!({ "date": "2024-01-15" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::PeerUnavailable { peer: PeerId::Scheduling, .. }));

        let status = client.status().await;
        let scheduling = status.get(PeerId::Scheduling).unwrap();
        assert_eq!(scheduling.status, ConnectionState::Disconnected);
        assert_eq!(scheduling.error, None);
        assert_eq!(status.get(PeerId::Email).unwrap().status, ConnectionState::Connected);

        let outcome = client
            .invoke_or_fallback(
                PeerId::Scheduling,
                "get_jobs",
                json!({ "date": "2024-01-15", "status": "scheduled" }),
                None,
            )
            .await;
        assert!(outcome.is_mock());
        assert!(outcome.payload["jobs"].is_array());
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn endpoint_mock_keeps_its_provenance() {
        let (client, _) = client(&[PeerId::Scheduling], false);
        let outcome = client
            .invoke_or_fallback(PeerId::Scheduling, "get_jobs", json!({ "date": "2024-01-15" }), None)
            .await;
        assert!(outcome.is_mock());
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn invalid_arguments_surface_as_tool_errors() {
        let (client, _) = client(&[PeerId::Scheduling], false);
        let result = client
            .invoke(PeerId::Scheduling, "get_jobs", json!({}))
            .await
            .unwrap();
        assert!(result.is_error);

        let err = client
            .invoke_payload(PeerId::Scheduling, "get_jobs", json!({}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ToolError { .. }));
    }

    #[tokio::test]
    async fn forced_mock_never_touches_transports() {
        let (client, factory) = client(&[PeerId::Scheduling], true);
        let outcome = client
            .invoke_or_fallback(PeerId::Scheduling, "get_customers", json!({}), None)
            .await;
        assert!(outcome.is_mock());
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disconnect_clears_registry_and_allows_reinitialize() {
        let (client, factory) = client(&[PeerId::Scheduling], false);
        client.initialize().await;
        let report = client.disconnect().await;
        assert_eq!(report.closed, vec![PeerId::Scheduling]);
        assert!(client.registered_peers().await.is_empty());
        assert_eq!(
            client.status().await.get(PeerId::Scheduling).unwrap().status,
            ConnectionState::Disconnected
        );

        let tools = client.list_tools(PeerId::Scheduling).await.unwrap();
        assert_eq!(tools.len(), 7);
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disconnect_keeps_closing_after_one_peer_fails() {
        let factory = Arc::new(StuckCloseFactory {
            inner: offline_endpoints(),
            stuck: PeerId::Email,
        });
        let config = ClientConfig::new(vec![
            PeerConfig::embedded(PeerId::Scheduling),
            PeerConfig::embedded(PeerId::Email),
        ]);
        let client = IntegrationClient::with_factory(config, factory);
        let summary = client.initialize().await;
        assert_eq!(summary.registered.len(), 2);

        let report = client.disconnect().await;
        assert_eq!(report.closed, vec![PeerId::Scheduling]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[&PeerId::Email].contains("stdin already closed"));
        assert!(client.registered_peers().await.is_empty());
    }

    #[tokio::test]
    async fn cancelled_call_reports_cancellation() {
        let (client, _) = client(&[PeerId::Email], false);
        let token = CancelToken::new();
        token.cancel();
        let err = client
            .invoke_with(PeerId::Email, "get_recent_emails", json!({}), Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { peer: PeerId::Email }));
    }
}
