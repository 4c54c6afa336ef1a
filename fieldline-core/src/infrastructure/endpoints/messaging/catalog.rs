use crate::domain::ToolDescriptor;
use serde_json::json;

/// Twilio's hard limit on a single message body.
pub(crate) const MAX_SMS_CHARS: u64 = 1600;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "send_sms",
            "Send SMS message via Twilio",
            json!({
                "type": "object",
                "properties": {
                    "to": {
                        "type": "string",
                        "description": "Recipient phone number (E.164 format: +1234567890)"
                    },
                    "message": {
                        "type": "string",
                        "maxLength": MAX_SMS_CHARS,
                        "description": "SMS message content (max 1600 characters)"
                    },
                    "from": {
                        "type": "string",
                        "description": "Sender phone number (optional, uses default if not provided)"
                    }
                },
                "required": ["to", "message"]
            }),
        ),
        ToolDescriptor::new(
            "get_recent_messages",
            "Get recent SMS messages",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "maximum": 50,
                        "description": "Number of messages to return (max 50)"
                    },
                    "direction": {
                        "type": "string",
                        "enum": ["inbound", "outbound"],
                        "description": "Filter by message direction"
                    },
                    "date_sent_after": {
                        "type": "string",
                        "description": "Filter messages sent after this date (YYYY-MM-DD)"
                    }
                }
            }),
        ),
        ToolDescriptor::new(
            "get_message_status",
            "Get delivery status of a sent message",
            json!({
                "type": "object",
                "properties": {
                    "message_sid": { "type": "string", "description": "Twilio message SID" }
                },
                "required": ["message_sid"]
            }),
        ),
        ToolDescriptor::new(
            "send_bulk_sms",
            "Send SMS to multiple recipients",
            json!({
                "type": "object",
                "properties": {
                    "recipients": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "phone": { "type": "string" },
                                "name": { "type": "string" },
                                "custom_message": { "type": "string", "maxLength": MAX_SMS_CHARS }
                            },
                            "required": ["phone"]
                        },
                        "description": "Array of recipients with phone numbers"
                    },
                    "message_template": {
                        "type": "string",
                        "maxLength": MAX_SMS_CHARS,
                        "description": "SMS template with {name} placeholder for personalization"
                    }
                },
                "required": ["recipients", "message_template"]
            }),
        ),
        ToolDescriptor::new(
            "schedule_reminder",
            "Schedule an SMS reminder",
            json!({
                "type": "object",
                "properties": {
                    "to": { "type": "string", "description": "Recipient phone number" },
                    "message": {
                        "type": "string",
                        "maxLength": MAX_SMS_CHARS,
                        "description": "Reminder message (max 1600 characters)"
                    },
                    "send_at": {
                        "type": "string",
                        "description": "When to send the reminder (ISO 8601 format)"
                    },
                    "customer_id": {
                        "type": "string",
                        "description": "Associated customer ID for tracking"
                    }
                },
                "required": ["to", "message", "send_at"]
            }),
        ),
    ]
}
