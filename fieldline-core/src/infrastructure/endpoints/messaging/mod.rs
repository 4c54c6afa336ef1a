//! Messaging endpoint backed by Twilio Programmable Messaging.

mod catalog;
pub(crate) mod mock;

use self::catalog::MAX_SMS_CHARS;
use crate::application::endpoint::{ToolEndpoint, UpstreamError, arg_str, arg_u64};
use crate::domain::{PeerId, ToolDescriptor};
use crate::infrastructure::upstream::{HttpUpstream, Upstream, UpstreamAuth, UpstreamRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Value, json};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const API_ROOT: &str = "https://api.twilio.com/2010-04-01/Accounts";
const BULK_PACING: Duration = Duration::from_millis(100);

pub struct MessagingEndpoint {
    upstream: Arc<dyn Upstream>,
    own_number: Option<String>,
    tools: Vec<ToolDescriptor>,
    pacing: Duration,
}

impl MessagingEndpoint {
    pub fn new(upstream: Arc<dyn Upstream>, own_number: Option<String>) -> Self {
        Self {
            upstream,
            own_number: own_number.filter(|n| !n.trim().is_empty()),
            tools: catalog::tools(),
            pacing: BULK_PACING,
        }
    }

    /// Delay between consecutive sends of a bulk batch.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Reads `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and `TWILIO_PHONE_NUMBER`.
    pub fn from_env() -> Self {
        let sid = env::var("TWILIO_ACCOUNT_SID").ok();
        let upstream = HttpUpstream::new(
            "twilio",
            format!("{API_ROOT}/{}", sid.clone().unwrap_or_default()),
            UpstreamAuth::Basic {
                username: sid,
                password: env::var("TWILIO_AUTH_TOKEN").ok(),
            },
        );
        Self::new(Arc::new(upstream), env::var("TWILIO_PHONE_NUMBER").ok())
    }

    async fn send_one(&self, to: &str, body: &str, from: Option<&str>) -> Result<Value, UpstreamError> {
        let from = from
            .or(self.own_number.as_deref())
            .ok_or_else(|| UpstreamError::missing_credentials(format!("{} sender number", self.upstream.name())))?;
        let form = vec![
            ("To".to_string(), to.to_string()),
            ("From".to_string(), from.to_string()),
            ("Body".to_string(), body.to_string()),
        ];
        self.upstream
            .send(UpstreamRequest::post_form("Messages.json", form))
            .await
    }

    async fn send_sms(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let sent = self
            .send_one(
                arg_str(arguments, "to").unwrap_or_default(),
                arg_str(arguments, "message").unwrap_or_default(),
                arg_str(arguments, "from"),
            )
            .await?;
        Ok(json!({
            "success": true,
            "message_sid": sent.get("sid"),
            "status": sent.get("status"),
            "to": sent.get("to"),
            "from": sent.get("from"),
            "date_sent": sent.get("date_created"),
            "price": sent.get("price"),
            "direction": sent.get("direction"),
        }))
    }

    async fn recent_messages(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let limit = arg_u64(arguments, "limit").unwrap_or(20).min(50);
        let request = UpstreamRequest::get("Messages.json")
            .query("PageSize", limit)
            .query_opt("DateSent>", arg_str(arguments, "date_sent_after"));
        let listing = self.upstream.send(request).await?;
        let direction = arg_str(arguments, "direction");
        let messages: Vec<Value> = listing
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|msg| match direction {
                Some(wanted) => msg
                    .get("direction")
                    .and_then(Value::as_str)
                    .is_some_and(|d| d.starts_with(wanted)),
                None => true,
            })
            .take(limit as usize)
            .map(|msg| {
                json!({
                    "sid": msg.get("sid"),
                    "from": msg.get("from"),
                    "to": msg.get("to"),
                    "body": msg.get("body"),
                    "status": msg.get("status"),
                    "direction": msg.get("direction"),
                    "date_sent": msg.get("date_sent"),
                    "date_created": msg.get("date_created"),
                    "price": msg.get("price"),
                    "error_code": msg.get("error_code"),
                    "error_message": msg.get("error_message"),
                })
            })
            .collect();
        Ok(json!({ "total_count": messages.len(), "messages": messages }))
    }

    async fn message_status(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let sid = arg_str(arguments, "message_sid").unwrap_or_default();
        let message = self
            .upstream
            .send(UpstreamRequest::get(format!("Messages/{sid}.json")))
            .await?;
        Ok(json!({
            "sid": message.get("sid"),
            "status": message.get("status"),
            "to": message.get("to"),
            "from": message.get("from"),
            "date_sent": message.get("date_sent"),
            "date_updated": message.get("date_updated"),
            "price": message.get("price"),
            "error_code": message.get("error_code"),
            "error_message": message.get("error_message"),
        }))
    }

    /// Sends one personalized message per recipient, pacing between sends.
    /// Per-recipient failures are reported in `results`; missing credentials
    /// abort the whole batch.
    async fn send_bulk(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let template = arg_str(arguments, "message_template").unwrap_or_default();
        let recipients = arguments
            .get("recipients")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut results = Vec::with_capacity(recipients.len());
        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            let phone = arg_str(recipient, "phone").unwrap_or_default();
            let name = arg_str(recipient, "name");
            let body = match arg_str(recipient, "custom_message") {
                Some(custom) => custom.to_string(),
                None => personalize(template, name),
            };
            let length = body.chars().count() as u64;
            if length > MAX_SMS_CHARS {
                warn!(%phone, length, "Bulk SMS body over the length limit, not sent");
                results.push(json!({
                    "phone": phone,
                    "name": name,
                    "success": false,
                    "error": format!("message must be at most {MAX_SMS_CHARS} characters (got {length})"),
                }));
                continue;
            }
            match self.send_one(phone, &body, None).await {
                Ok(sent) => results.push(json!({
                    "phone": phone,
                    "name": name,
                    "success": true,
                    "message_sid": sent.get("sid"),
                    "status": sent.get("status"),
                })),
                Err(err @ UpstreamError::MissingCredentials { .. }) => return Err(err),
                Err(err) => {
                    warn!(%phone, %err, "Bulk SMS recipient failed");
                    results.push(json!({
                        "phone": phone,
                        "name": name,
                        "success": false,
                        "error": err.to_string(),
                    }));
                }
            }
        }

        let successful = results.iter().filter(|r| r["success"] == true).count();
        Ok(json!({
            "total_sent": recipients.len(),
            "successful": successful,
            "failed": results.len() - successful,
            "results": results,
        }))
    }

    async fn schedule_reminder(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let send_at_text = arg_str(arguments, "send_at").unwrap_or_default();
        let Some(send_at) = parse_instant(send_at_text) else {
            return Ok(json!({
                "success": false,
                "error": format!("send_at '{send_at_text}' is not an ISO 8601 timestamp"),
            }));
        };
        if send_at <= Utc::now() {
            debug!(%send_at, "Reminder time already passed, sending now");
            return self.send_sms(arguments).await;
        }
        Ok(json!({
            "success": true,
            "scheduled": true,
            "reminder_id": format!("reminder_{}", Uuid::new_v4().simple()),
            "send_at": send_at_text,
            "to": arg_str(arguments, "to"),
            "customer_id": arg_str(arguments, "customer_id"),
            "message": arg_str(arguments, "message"),
            "detail": "Reminder scheduled (would use job queue in real implementation)",
        }))
    }
}

/// Replaces every `{name}` with the recipient name, or "Customer".
pub(crate) fn personalize(template: &str, name: Option<&str>) -> String {
    template.replace("{name}", name.filter(|n| !n.is_empty()).unwrap_or("Customer"))
}

/// RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl ToolEndpoint for MessagingEndpoint {
    fn peer(&self) -> PeerId {
        PeerId::Messaging
    }

    fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, arguments: &Value) -> Result<Value, UpstreamError> {
        match tool {
            "send_sms" => self.send_sms(arguments).await,
            "get_recent_messages" => self.recent_messages(arguments).await,
            "get_message_status" => self.message_status(arguments).await,
            "send_bulk_sms" => self.send_bulk(arguments).await,
            "schedule_reminder" => self.schedule_reminder(arguments).await,
            other => Err(UpstreamError::not_found(self.upstream.name(), other)),
        }
    }

    fn fallback(&self, tool: &str, arguments: &Value, error: &UpstreamError) -> Value {
        mock::payload(tool, arguments, &error.to_string(), self.own_number.as_deref())
    }
}
