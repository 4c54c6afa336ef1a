use crate::application::endpoint::{arg_str, tag_mock};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

pub const NOTE: &str = "Mock data - Gmail API unavailable";

pub(crate) fn payload(tool: &str, arguments: &Value, error: &str) -> Value {
    match tool {
        "get_recent_emails" => tag_mock(json!({ "emails": recent_emails() }), NOTE),
        "send_email" => tag_mock(
            json!({ "success": false, "error": error }),
            "Email would be sent in real implementation",
        ),
        "search_emails" => tag_mock(
            json!({ "messages": [], "error": error }),
            "Search unavailable - Gmail API not accessible",
        ),
        "get_email_thread" => tag_mock(
            json!({ "thread_id": arg_str(arguments, "thread_id"), "error": error }),
            "Thread retrieval failed",
        ),
        "mark_as_read" => tag_mock(json!({ "success": false, "error": error }), NOTE),
        _ => tag_mock(json!({}), NOTE),
    }
}

fn recent_emails() -> Value {
    let now = Utc::now();
    json!([
        {
            "id": "msg_001",
            "threadId": "thread_001",
            "subject": "Service Reminder - HVAC Maintenance Due",
            "from": "sarah.johnson@email.com",
            "to": "me@business.com",
            "date": now.to_rfc3339(),
            "snippet": "Hi, I wanted to schedule my annual HVAC maintenance...",
            "unread": true
        },
        {
            "id": "msg_002",
            "threadId": "thread_002",
            "subject": "Payment Confirmation - Invoice #1234",
            "from": "robert.smith@email.com",
            "to": "me@business.com",
            "date": (now - Duration::hours(1)).to_rfc3339(),
            "snippet": "Thank you for the excellent service. Payment has been processed...",
            "unread": false
        }
    ])
}
