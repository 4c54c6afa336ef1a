//! Substitute data served when a live call cannot be made or fails.
//! Everything here is tagged with a mock provenance marker.

use crate::domain::PeerId;
use crate::infrastructure::endpoints;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

pub const INBOX_NOTE: &str = "Mock data - email integration unavailable";

/// The payload the peer's own endpoint would substitute for `tool`.
pub fn mock_payload(peer: PeerId, tool: &str, arguments: &Value, reason: &str) -> Value {
    endpoints::mock_payload(peer, tool, arguments, reason)
}

/// Canned inbox, newest first, cut to `limit` messages.
pub fn mock_inbox(limit: usize) -> Vec<Value> {
    let now = Utc::now();
    let hours_ago = |hours: i64| (now - Duration::hours(hours)).to_rfc3339();
    let emails = [
        (
            "Service Reminder - HVAC Maintenance Due",
            "Sarah Johnson <sarah.johnson@email.com>",
            0,
            "Hi, I wanted to schedule my annual HVAC maintenance for next week. Could we set up an appointment?",
            true,
        ),
        (
            "Payment Confirmation - Invoice #1234",
            "Robert Smith <robert.smith@email.com>",
            1,
            "Thank you for the excellent plumbing service yesterday. Payment has been processed successfully.",
            false,
        ),
        (
            "Equipment Issue - Urgent",
            "Emily Davis <emily.davis@email.com>",
            2,
            "The electrical outlet installation seems to have an issue. The GFCI keeps tripping. Can someone come take a look?",
            true,
        ),
        (
            "Warranty Renewal Question",
            "Michael Wilson <michael.wilson@email.com>",
            24,
            "I received a notice that my HVAC warranty is expiring soon. What are my options for renewal?",
            true,
        ),
        (
            "Schedule Change Request",
            "Lisa Brown <lisa.brown@email.com>",
            48,
            "I need to reschedule our appointment for tomorrow to next week due to a family emergency.",
            false,
        ),
        (
            "New Customer Inquiry",
            "James Martinez <james.martinez@email.com>",
            72,
            "Hi, I was referred by Sarah Johnson. I need HVAC installation for my new home. Can you provide a quote?",
            true,
        ),
    ];

    emails
        .iter()
        .enumerate()
        .take(limit)
        .map(|(index, (subject, from, age, snippet, unread))| {
            let n = index + 1;
            json!({
                "id": format!("mock_{n:03}"),
                "threadId": format!("thread_{n:03}"),
                "subject": subject,
                "from": from,
                "to": "business@company.com",
                "date": hours_ago(*age),
                "snippet": snippet,
                "unread": unread,
            })
        })
        .collect()
}

/// Inbox-shaped payload wrapping [`mock_inbox`].
pub fn mock_inbox_payload(limit: usize) -> Value {
    json!({
        "emails": mock_inbox(limit),
        "note": INBOX_NOTE,
        "source": "mock",
    })
}
