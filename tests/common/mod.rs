//! Shared fixtures: an in-memory upstream and a scripted tool endpoint.
#![allow(dead_code)]

use async_trait::async_trait;
use fieldline_core::application::client::{ClientConfig, IntegrationClient};
use fieldline_core::application::endpoint::{ToolEndpoint, UpstreamError, tag_mock};
use fieldline_core::application::transport::DefaultTransportFactory;
use fieldline_core::config::PeerConfig;
use fieldline_core::domain::{PeerId, ToolDescriptor};
use fieldline_core::infrastructure::upstream::{Upstream, UpstreamRequest};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers by request path and records what it was asked.
#[derive(Default)]
pub struct StaticUpstream {
    routes: HashMap<String, Value>,
    offline: bool,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl StaticUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn route(mut self, path: &str, response: Value) -> Self {
        self.routes.insert(path.to_string(), response);
        self
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for StaticUpstream {
    fn name(&self) -> &str {
        "static"
    }

    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.offline {
            return Err(UpstreamError::missing_credentials("static"));
        }
        self.routes
            .get(&request.path)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found("static", request.path.clone()))
    }
}

/// Serves fixed payloads for a handful of tools, optionally after a delay.
pub struct CannedEndpoint {
    peer: PeerId,
    tools: Vec<ToolDescriptor>,
    responses: HashMap<String, Value>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CannedEndpoint {
    pub fn new(peer: PeerId) -> Self {
        Self {
            peer,
            tools: Vec::new(),
            responses: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(mut self, tool: &str, payload: Value) -> Self {
        self.tools.push(ToolDescriptor::new(
            tool,
            format!("canned {tool}"),
            json!({ "type": "object" }),
        ));
        self.responses.insert(tool.to_string(), payload);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolEndpoint for CannedEndpoint {
    fn peer(&self) -> PeerId {
        self.peer
    }

    fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, _arguments: &Value) -> Result<Value, UpstreamError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(tool)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found("canned", tool))
    }

    fn fallback(&self, _tool: &str, _arguments: &Value, _error: &UpstreamError) -> Value {
        tag_mock(json!({}), "Mock data - canned endpoint unavailable")
    }
}

/// Client whose peers all run embedded on the given endpoints.
pub fn embedded_client(endpoints: &[Arc<CannedEndpoint>], timeout: Duration) -> IntegrationClient {
    let mut factory = DefaultTransportFactory::new();
    let mut peers = Vec::new();
    for endpoint in endpoints {
        peers.push(PeerConfig::embedded(endpoint.peer()));
        factory = factory.with_endpoint(endpoint.clone());
    }
    let config = ClientConfig::new(peers).with_request_timeout(timeout);
    IntegrationClient::with_factory(config, Arc::new(factory))
}

pub fn scheduling() -> CannedEndpoint {
    CannedEndpoint::new(PeerId::Scheduling)
        .respond(
            "get_jobs",
            json!({ "jobs": [{ "id": "job_1", "customer": "Acme", "scheduled_start": "09:00" }] }),
        )
        .respond(
            "get_customers",
            json!({ "customers": [{ "id": "cus_1", "name": "Acme" }] }),
        )
}

pub fn accounting() -> CannedEndpoint {
    CannedEndpoint::new(PeerId::Accounting)
        .respond("get_revenue_summary", json!({ "total_revenue": 1000 }))
        .respond(
            "get_outstanding_invoices",
            json!({ "invoices": [], "total_outstanding": 0 }),
        )
        .respond("get_expenses_summary", json!({ "total_expenses": 400 }))
}

pub fn email() -> CannedEndpoint {
    CannedEndpoint::new(PeerId::Email)
        .respond(
            "get_recent_emails",
            json!({
                "emails": [
                    { "id": "e1", "subject": "Urgent: water leak", "snippet": "", "unread": true },
                    { "id": "e2", "subject": "Invoice paid", "snippet": "thanks", "unread": false }
                ]
            }),
        )
        .respond("send_email", json!({ "success": true, "messageId": "m1" }))
}

pub fn messaging() -> CannedEndpoint {
    CannedEndpoint::new(PeerId::Messaging)
        .respond(
            "get_recent_messages",
            json!({ "messages": [{ "sid": "SM1", "body": "On my way" }] }),
        )
        .respond("send_sms", json!({ "success": true, "sid": "SM2" }))
}
