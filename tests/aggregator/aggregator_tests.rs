// Context aggregation tests - concurrent fan-out, partial failure and intent
// routing across four embedded peers.

#[path = "../common/mod.rs"]
mod common;

use common::embedded_client;
use fieldline_core::application::aggregator::{
    CallerContext, ChatMessage, ContextAggregator, FieldSource, Intent,
};
use fieldline_core::application::cancel::CancelToken;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const TIMEOUT: Duration = Duration::from_secs(10);

fn aggregator_with(delays: [Duration; 4], timeout: Duration) -> ContextAggregator {
    let [scheduling, accounting, email, messaging] = delays;
    let client = embedded_client(
        &[
            Arc::new(common::scheduling().with_delay(scheduling)),
            Arc::new(common::accounting().with_delay(accounting)),
            Arc::new(common::email().with_delay(email)),
            Arc::new(common::messaging().with_delay(messaging)),
        ],
        timeout,
    );
    ContextAggregator::new(Arc::new(client))
}

#[tokio::test(start_paused = true)]
async fn reads_run_concurrently() {
    let delay = Duration::from_millis(300);
    let aggregator = aggregator_with([delay; 4], TIMEOUT);

    let started = Instant::now();
    let context = aggregator
        .build_context(&CallerContext::default(), Some("what's on today?"), None)
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= delay, "finished before the slowest read: {elapsed:?}");
    assert!(elapsed < delay * 2, "reads were serialized: {elapsed:?}");
    assert!(context.errors.is_empty(), "unexpected errors: {:?}", context.errors);
    assert_eq!(context.source_flags.schedule, FieldSource::Real);
    assert_eq!(context.source_flags.customers, FieldSource::Real);
    assert_eq!(context.source_flags.financials, FieldSource::Real);
    assert_eq!(context.source_flags.communications, FieldSource::Real);
}

#[tokio::test]
async fn live_context_carries_every_field() {
    let context = aggregator_with([Duration::ZERO; 4], TIMEOUT)
        .build_context(&CallerContext::default(), None, None)
        .await;

    assert_eq!(context.schedule["jobs"][0]["id"], "job_1");
    assert_eq!(context.customers["customers"][0]["name"], "Acme");
    assert_eq!(context.financials["revenue"]["total_revenue"], 1000);
    assert_eq!(context.financials["expenses"]["total_expenses"], 400);
    assert_eq!(context.communications.emails.len(), 2);
    assert_eq!(context.communications.sms.len(), 1);
    assert_eq!(context.urgent_email_count, 1);
    assert_eq!(context.intent, Intent::General);
}

#[tokio::test(start_paused = true)]
async fn one_slow_peer_only_empties_its_own_field() {
    let aggregator = aggregator_with(
        [
            Duration::ZERO,
            Duration::from_secs(60),
            Duration::ZERO,
            Duration::ZERO,
        ],
        Duration::from_secs(1),
    );

    let started = Instant::now();
    let context = aggregator
        .build_context(&CallerContext::default(), None, None)
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(
        context.errors.keys().map(String::as_str).collect::<Vec<_>>(),
        ["financials"]
    );
    assert_eq!(context.source_flags.financials, FieldSource::Unavailable);
    assert_eq!(context.financials["revenue"], serde_json::Value::Null);
    assert_eq!(context.source_flags.schedule, FieldSource::Real);
    assert_eq!(context.schedule["jobs"][0]["id"], "job_1");
    assert_eq!(context.communications.emails.len(), 2);
}

#[tokio::test]
async fn email_request_in_history_switches_the_read() {
    let caller = CallerContext {
        previous_messages: vec![
            ChatMessage::new("user", "how are invoices looking?"),
            ChatMessage::new("assistant", "Two are overdue."),
            ChatMessage::new("user", "show me my last 2 emails"),
        ],
    };
    let context = aggregator_with([Duration::ZERO; 4], TIMEOUT)
        .build_context(&caller, None, None)
        .await;

    assert_eq!(context.intent, Intent::Email { limit: 2 });
    assert!(context.is_email_request());
    assert!(context.communications.sms.is_empty());
    assert_eq!(context.source_flags.communications, FieldSource::Real);
}

#[tokio::test]
async fn cancelled_build_still_returns_a_context() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let context = aggregator_with([Duration::ZERO; 4], TIMEOUT)
        .build_context(&CallerContext::default(), None, Some(&cancel))
        .await;

    assert_eq!(context.schedule, json!({ "jobs": [] }));
    assert_eq!(context.source_flags.schedule, FieldSource::Unavailable);
    assert!(context.errors.contains_key("schedule"));
    assert_eq!(context.source_flags.communications, FieldSource::Mock);
}

#[tokio::test]
async fn context_serializes_in_camel_case() {
    let context = aggregator_with([Duration::ZERO; 4], TIMEOUT)
        .build_context(&CallerContext::default(), Some("any urgent emails?"), None)
        .await;

    let value = serde_json::to_value(&context).expect("serialize");
    assert_eq!(value["urgentEmailCount"], 1);
    assert_eq!(value["sourceFlags"]["communications"], "real");
    assert_eq!(value["intent"], json!({ "kind": "email", "limit": 5 }));
    assert!(value.get("errors").is_none());
}
