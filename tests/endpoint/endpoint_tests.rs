// Tool endpoint tests - catalogs, dispatch and substitution through the
// public call_tool entry point.

#[path = "../common/mod.rs"]
mod common;

use common::StaticUpstream;
use fieldline_core::application::endpoint::{ToolEndpoint, call_tool};
use fieldline_core::domain::{PeerId, Provenance};
use fieldline_core::endpoints::{self, MessagingEndpoint, SchedulingEndpoint};
use serde_json::{Value, json};
use std::sync::Arc;

#[test]
fn every_peer_advertises_a_catalog() {
    for peer in PeerId::ALL {
        let endpoint = endpoints::from_env(peer);
        assert_eq!(endpoint.peer(), peer);
        assert!(!endpoint.tools().is_empty(), "{peer} has no tools");
    }
}

#[test]
fn accounting_catalog_is_read_only_and_prefixed() {
    let endpoint = endpoints::from_env(PeerId::Accounting);
    let names: Vec<&str> = endpoint.tools().iter().map(|tool| tool.name.as_str()).collect();
    assert!(names.iter().all(|name| name.starts_with("get_")));
    assert!(names.contains(&"get_outstanding_invoices"));
    assert!(names.contains(&"get_profit_loss"));
}

#[tokio::test]
async fn live_call_returns_upstream_payload() {
    let upstream = Arc::new(StaticUpstream::new().route(
        "jobs",
        json!({ "jobs": [{ "id": "job_7", "scheduled_start": "2026-10-18T09:00:00Z" }] }),
    ));
    let endpoint = SchedulingEndpoint::new(upstream.clone());

    let result = call_tool(&endpoint, "get_jobs", json!({ "date": "2026-10-18" })).await;
    assert!(!result.is_error);
    let payload = result.payload().expect("json payload");
    assert_eq!(payload["jobs"][0]["id"], "job_7");
    assert_eq!(Provenance::detect(&payload), Provenance::Real);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("scheduled_start"), Some("2026-10-18"));
}

#[tokio::test]
async fn route_optimization_orders_by_start_time() {
    let upstream = Arc::new(StaticUpstream::new().route(
        "jobs",
        json!({ "jobs": [
            { "id": "late", "scheduled_start": "2026-10-18T15:00:00Z" },
            { "id": "unscheduled" },
            { "id": "early", "scheduled_start": "2026-10-18T08:00:00Z" }
        ] }),
    ));
    let endpoint = SchedulingEndpoint::new(upstream);

    let payload = call_tool(&endpoint, "optimize_route", json!({ "date": "2026-10-18" }))
        .await
        .payload()
        .expect("json payload");
    let order: Vec<&str> = payload["optimized_route"]
        .as_array()
        .expect("route")
        .iter()
        .filter_map(|job| job["id"].as_str())
        .collect();
    assert_eq!(order, ["early", "late", "unscheduled"]);
}

#[tokio::test]
async fn upstream_failure_serves_tagged_substitute() {
    let endpoint = SchedulingEndpoint::new(Arc::new(StaticUpstream::offline()));

    let result = call_tool(&endpoint, "get_customers", json!({ "limit": 5 })).await;
    assert!(!result.is_error);
    let payload = result.payload().expect("json payload");
    assert_eq!(Provenance::detect(&payload), Provenance::Mock);
    assert_eq!(payload["source"], "mock");
    assert!(payload["customers"].is_array());
}

#[tokio::test]
async fn offline_schedule_carries_the_mock_marker() {
    let endpoint = SchedulingEndpoint::new(Arc::new(StaticUpstream::offline()));

    let payload = call_tool(
        &endpoint,
        "get_jobs",
        json!({ "date": "2024-01-15", "status": "scheduled" }),
    )
    .await
    .payload()
    .expect("json payload");
    assert!(payload["jobs"].as_array().is_some_and(|jobs| !jobs.is_empty()));
    assert_eq!(payload["note"], "Mock data - HouseCall Pro API unavailable");
}

#[tokio::test]
async fn unknown_tool_is_an_error_result() {
    let endpoint = SchedulingEndpoint::new(Arc::new(StaticUpstream::new()));

    let result = call_tool(&endpoint, "delete_everything", json!({})).await;
    assert!(result.is_error);
    let details: Value = serde_json::from_str(result.text().expect("text")).expect("json details");
    assert_eq!(details["error"], "unknown_tool");
    assert_eq!(details["tool"], "delete_everything");
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_upstream() {
    let upstream = Arc::new(StaticUpstream::new());
    let endpoint = MessagingEndpoint::new(upstream.clone(), Some("+15550100".to_string()));

    let missing = call_tool(&endpoint, "send_sms", json!({ "message": "hi" })).await;
    assert!(missing.is_error);

    let too_long = call_tool(
        &endpoint,
        "send_sms",
        json!({ "to": "+15550199", "message": "x".repeat(1601) }),
    )
    .await;
    assert!(too_long.is_error);
    let details: Value = serde_json::from_str(too_long.text().expect("text")).expect("json details");
    assert_eq!(details["error"], "invalid_arguments");

    assert!(upstream.requests().is_empty());
}
