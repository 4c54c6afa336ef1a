// Protocol tests - a stream transport talking to the endpoint server over an
// in-memory pipe, exercising the same framing a child process would use.

#[path = "../common/mod.rs"]
mod common;

use common::CannedEndpoint;
use fieldline_core::application::endpoint::ToolEndpoint;
use fieldline_core::application::transport::{CallOptions, ProcessTransport, Transport, TransportError};
use fieldline_core::domain::{PeerId, ToolResult};
use fieldline_core::rpc::RpcDispatcher;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn connected_pair(endpoint: CannedEndpoint) -> ProcessTransport {
    let peer = endpoint.peer();
    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let (client_read, client_write) = tokio::io::split(client_side);

    let dispatcher = RpcDispatcher::new(Arc::new(endpoint));
    tokio::spawn(async move { dispatcher.serve(server_read, server_write).await });
    ProcessTransport::over_stream(peer, client_read, client_write)
}

fn options() -> CallOptions {
    CallOptions::new(Duration::from_secs(5))
}

#[tokio::test]
async fn handshake_caches_the_catalog() {
    let transport = connected_pair(common::email());
    transport.connect(&options()).await.expect("connect");

    assert!(transport.is_connected());
    let names: Vec<String> = transport.tools().await.into_iter().map(|tool| tool.name).collect();
    assert_eq!(names, ["get_recent_emails", "send_email"]);

    let pong = transport.request("ping", json!({}), &options()).await.expect("ping");
    assert_eq!(pong, json!({ "status": "ok" }));
}

#[tokio::test]
async fn tool_call_round_trips_the_payload() {
    let transport = connected_pair(common::messaging());
    transport.connect(&options()).await.expect("connect");

    let raw = transport
        .request(
            "tools/call",
            json!({ "name": "send_sms", "arguments": { "to": "+15550100", "message": "hi" } }),
            &options(),
        )
        .await
        .expect("tools/call");
    let result: ToolResult = serde_json::from_value(raw).expect("tool result");
    assert_eq!(result.payload(), Ok(json!({ "success": true, "sid": "SM2" })));
}

#[tokio::test]
async fn concurrent_requests_are_correlated() {
    let transport = connected_pair(common::scheduling());
    transport.connect(&options()).await.expect("connect");

    let calls = ["get_jobs", "get_customers", "get_jobs", "get_customers"].map(|tool| {
        let transport = &transport;
        async move {
            let raw = transport
                .request("tools/call", json!({ "name": tool, "arguments": {} }), &options())
                .await
                .expect("tools/call");
            let result: ToolResult = serde_json::from_value(raw).expect("tool result");
            (tool, result.payload().expect("payload"))
        }
    });

    for (tool, payload) in futures::future::join_all(calls).await {
        let key = if tool == "get_jobs" { "jobs" } else { "customers" };
        assert!(payload.get(key).is_some(), "{tool} answered with {payload}");
    }
}

#[tokio::test]
async fn protocol_errors_surface_as_rpc_errors() {
    let transport = connected_pair(common::email());
    transport.connect(&options()).await.expect("connect");

    let unknown = transport.request("resources/list", json!({}), &options()).await;
    assert!(matches!(unknown, Err(TransportError::Rpc { code: -32601, .. })));

    let nameless = transport.request("tools/call", json!({ "arguments": {} }), &options()).await;
    assert!(matches!(nameless, Err(TransportError::Rpc { code: -32602, .. })));
}

#[tokio::test(start_paused = true)]
async fn slow_tool_times_out_without_closing_the_session() {
    let endpoint = common::email().with_delay(Duration::from_secs(30));
    let transport = connected_pair(endpoint);
    transport.connect(&options()).await.expect("connect");

    let short = CallOptions::new(Duration::from_millis(200));
    let slow = transport
        .request("tools/call", json!({ "name": "get_recent_emails", "arguments": {} }), &short)
        .await;
    assert!(matches!(slow, Err(TransportError::Timeout { peer: PeerId::Email, .. })));
    assert!(transport.is_connected());

    let pong: Value = transport.request("ping", json!({}), &short).await.expect("ping");
    assert!(pong.is_object());
}

#[tokio::test]
async fn closed_transport_rejects_requests() {
    let transport = connected_pair(common::email());
    transport.connect(&options()).await.expect("connect");
    transport.close().await.expect("close");

    let result = transport.request("ping", json!({}), &options()).await;
    assert!(matches!(result, Err(TransportError::NotConnected { .. })));
}
