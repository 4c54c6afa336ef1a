use crate::application::endpoint::{arg_str, tag_mock};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

pub const NOTE: &str = "Mock data - Twilio API unavailable";
const DEFAULT_NUMBER: &str = "+15551234567";

pub(crate) fn payload(tool: &str, arguments: &Value, error: &str, own_number: Option<&str>) -> Value {
    match tool {
        "send_sms" | "schedule_reminder" => tag_mock(
            json!({
                "success": false,
                "error": error,
                "to": arg_str(arguments, "to"),
                "message": arg_str(arguments, "message"),
            }),
            "SMS would be sent in real implementation",
        ),
        "get_recent_messages" => tag_mock(
            json!({ "messages": recent_messages(own_number.unwrap_or(DEFAULT_NUMBER)) }),
            NOTE,
        ),
        "get_message_status" => tag_mock(
            json!({ "error": error, "message_sid": arg_str(arguments, "message_sid") }),
            "Status check failed",
        ),
        "send_bulk_sms" => tag_mock(json!({ "error": error }), "Bulk SMS sending failed"),
        _ => tag_mock(json!({}), NOTE),
    }
}

fn recent_messages(own_number: &str) -> Value {
    let now = Utc::now();
    let millis = now.timestamp_millis();
    json!([
        {
            "sid": format!("SM{millis}"),
            "from": own_number,
            "to": "+15559876543",
            "body": "Your appointment is confirmed for tomorrow at 2:00 PM. Please reply CONFIRM.",
            "status": "delivered",
            "direction": "outbound",
            "date_sent": now.to_rfc3339(),
            "price": "-0.0075"
        },
        {
            "sid": format!("SM{}", millis - 1000),
            "from": "+15559876543",
            "to": own_number,
            "body": "CONFIRM",
            "status": "received",
            "direction": "inbound",
            "date_sent": (now - Duration::minutes(5)).to_rfc3339(),
            "price": null
        }
    ])
}
