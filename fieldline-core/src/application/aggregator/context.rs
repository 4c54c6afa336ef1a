use super::intent::Intent;
use crate::application::client::Communications;
use crate::domain::Provenance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// What the caller knows about the conversation so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    #[serde(default)]
    pub previous_messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Real,
    Mock,
    /// The call failed and the field holds a neutral value.
    Unavailable,
}

impl From<Provenance> for FieldSource {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Real => FieldSource::Real,
            Provenance::Mock => FieldSource::Mock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SourceFlags {
    pub schedule: FieldSource,
    pub customers: FieldSource,
    pub financials: FieldSource,
    pub communications: FieldSource,
}

/// Cross-system snapshot, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContext {
    #[schema(value_type = Object)]
    pub schedule: Value,
    #[schema(value_type = Object)]
    pub customers: Value,
    #[schema(value_type = Object)]
    pub financials: Value,
    pub communications: Communications,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    pub source_flags: SourceFlags,
    /// Field name to the reason it could not be fetched.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    pub intent: Intent,
    pub urgent_email_count: usize,
}

impl BusinessContext {
    pub fn is_email_request(&self) -> bool {
        self.intent.is_email()
    }
}

/// Unread, with "urgent" or "issue" in the subject or "urgent" in the snippet.
pub fn is_urgent(email: &Value) -> bool {
    let unread = email.get("unread").and_then(Value::as_bool).unwrap_or(false);
    if !unread {
        return false;
    }
    let text = |key: &str| {
        email
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    };
    let subject = text("subject");
    subject.contains("urgent") || subject.contains("issue") || text("snippet").contains("urgent")
}

pub fn count_urgent(emails: &[Value]) -> usize {
    emails.iter().filter(|email| is_urgent(email)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fallback::mock_inbox;
    use serde_json::json;

    #[test]
    fn urgency_needs_unread_and_keyword() {
        assert!(is_urgent(&json!({ "unread": true, "subject": "Equipment Issue", "snippet": "" })));
        assert!(is_urgent(&json!({ "unread": true, "subject": "Hi", "snippet": "URGENT leak" })));
        assert!(!is_urgent(&json!({ "unread": false, "subject": "Urgent", "snippet": "" })));
        assert!(!is_urgent(&json!({ "unread": true, "subject": "Hi", "snippet": "an issue" })));
        assert!(!is_urgent(&json!({ "subject": "Urgent" })));
    }

    #[test]
    fn canned_inbox_has_one_urgent_email() {
        assert_eq!(count_urgent(&mock_inbox(6)), 1);
    }

    #[test]
    fn caller_context_reads_camel_case() {
        let caller: CallerContext = serde_json::from_value(json!({
            "previousMessages": [{ "role": "user", "content": "hello" }]
        }))
        .unwrap();
        assert_eq!(caller.previous_messages[0].content, "hello");
    }
}
