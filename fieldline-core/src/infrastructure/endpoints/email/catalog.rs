use crate::domain::ToolDescriptor;
use serde_json::json;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "get_recent_emails",
            "Get recent emails from inbox",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "maximum": 50,
                        "description": "Number of emails to retrieve (max 50)"
                    },
                    "query": {
                        "type": "string",
                        "description": "Gmail search query (e.g., \"is:unread\", \"from:customer@email.com\")"
                    },
                    "include_body": {
                        "type": "boolean",
                        "description": "Include email body content"
                    }
                }
            }),
        ),
        ToolDescriptor::new(
            "send_email",
            "Send an email",
            json!({
                "type": "object",
                "properties": {
                    "to": { "type": "string", "description": "Recipient email address" },
                    "subject": { "type": "string", "description": "Email subject" },
                    "body": { "type": "string", "description": "Email body (plain text)" },
                    "cc": { "type": "string", "description": "CC recipients (comma-separated)" },
                    "reply_to": { "type": "string", "description": "Reply-to address" }
                },
                "required": ["to", "subject", "body"]
            }),
        ),
        ToolDescriptor::new(
            "search_emails",
            "Search emails with specific criteria",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Gmail search query" },
                    "max_results": { "type": "integer", "description": "Maximum number of results" }
                },
                "required": ["query"]
            }),
        ),
        ToolDescriptor::new(
            "get_email_thread",
            "Get complete email thread/conversation",
            json!({
                "type": "object",
                "properties": {
                    "thread_id": { "type": "string", "description": "Gmail thread ID" }
                },
                "required": ["thread_id"]
            }),
        ),
        ToolDescriptor::new(
            "mark_as_read",
            "Mark emails as read",
            json!({
                "type": "object",
                "properties": {
                    "message_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of message IDs to mark as read"
                    }
                },
                "required": ["message_ids"]
            }),
        ),
    ]
}
