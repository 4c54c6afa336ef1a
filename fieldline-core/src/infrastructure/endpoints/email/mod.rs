//! Email endpoint backed by the Gmail API.

mod catalog;
mod message;
pub(crate) mod mock;

use crate::application::endpoint::{ToolEndpoint, UpstreamError, arg_bool, arg_str, arg_u64};
use crate::domain::{PeerId, ToolDescriptor};
use crate::infrastructure::upstream::{HttpUpstream, Upstream, UpstreamAuth, UpstreamRequest};
use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use message::OutgoingEmail;
use serde_json::{Value, json};
use std::env;
use std::sync::Arc;
use tracing::warn;

const BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const MAX_RECENT: u64 = 50;

pub struct EmailEndpoint {
    upstream: Arc<dyn Upstream>,
    tools: Vec<ToolDescriptor>,
}

impl EmailEndpoint {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            tools: catalog::tools(),
        }
    }

    /// Reads `GMAIL_ACCESS_TOKEN`.
    pub fn from_env() -> Self {
        let upstream = HttpUpstream::new(
            "gmail",
            BASE_URL,
            UpstreamAuth::Bearer(env::var("GMAIL_ACCESS_TOKEN").ok()),
        );
        Self::new(Arc::new(upstream))
    }

    async fn recent_emails(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let limit = arg_u64(arguments, "limit").unwrap_or(10).min(MAX_RECENT);
        let include_body = arg_bool(arguments, "include_body").unwrap_or(false);
        let listing = self
            .upstream
            .send(
                UpstreamRequest::get("messages")
                    .query("q", arg_str(arguments, "query").unwrap_or("in:inbox"))
                    .query("maxResults", limit),
            )
            .await?;

        let ids: Vec<String> = listing
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .take(limit as usize)
            .filter_map(|m| m.get("id").and_then(Value::as_str).map(str::to_string))
            .collect();

        let format = if include_body { "full" } else { "metadata" };
        let fetches = ids.iter().map(|id| {
            self.upstream
                .send(UpstreamRequest::get(format!("messages/{id}")).query("format", format))
        });
        let mut emails = Vec::with_capacity(ids.len());
        for (id, fetched) in ids.iter().zip(join_all(fetches).await) {
            match fetched {
                Ok(detail) => emails.push(message::summarize(&detail, include_body)),
                Err(err) => warn!(message_id = %id, %err, "Skipping unreadable message"),
            }
        }

        Ok(json!({
            "emails": emails,
            "total_found": listing.get("resultSizeEstimate"),
        }))
    }

    async fn send_email(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let email = OutgoingEmail {
            to: arg_str(arguments, "to").unwrap_or_default(),
            subject: arg_str(arguments, "subject").unwrap_or_default(),
            body: arg_str(arguments, "body").unwrap_or_default(),
            cc: arg_str(arguments, "cc"),
            reply_to: arg_str(arguments, "reply_to"),
        };
        let sent = self
            .upstream
            .send(UpstreamRequest::post_json(
                "messages/send",
                json!({ "raw": email.encode() }),
            ))
            .await?;
        Ok(json!({
            "success": true,
            "message_id": sent.get("id"),
            "thread_id": sent.get("threadId"),
        }))
    }

    async fn search(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let listing = self
            .upstream
            .send(
                UpstreamRequest::get("messages")
                    .query("q", arg_str(arguments, "query").unwrap_or_default())
                    .query("maxResults", arg_u64(arguments, "max_results").unwrap_or(25)),
            )
            .await?;
        Ok(json!({
            "messages": listing.get("messages").cloned().unwrap_or_else(|| json!([])),
            "result_size_estimate": listing.get("resultSizeEstimate"),
        }))
    }

    async fn thread(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let thread_id = arg_str(arguments, "thread_id").unwrap_or_default();
        let thread = self
            .upstream
            .send(UpstreamRequest::get(format!("threads/{thread_id}")))
            .await?;
        let messages: Vec<Value> = thread
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::invalid_response(self.upstream.name(), "thread has no messages"))?
            .iter()
            .map(|m| {
                let mut summary = message::summarize(m, true);
                if let Some(map) = summary.as_object_mut() {
                    map.remove("to");
                    map.remove("unread");
                    map.remove("threadId");
                }
                summary
            })
            .collect();
        Ok(json!({
            "thread_id": thread_id,
            "message_count": messages.len(),
            "messages": messages,
        }))
    }

    async fn mark_as_read(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let ids: Vec<&str> = arguments
            .get("message_ids")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let updates = ids.iter().map(|id| {
            self.upstream.send(UpstreamRequest::post_json(
                format!("messages/{id}/modify"),
                json!({ "removeLabelIds": ["UNREAD"] }),
            ))
        });
        try_join_all(updates).await?;
        Ok(json!({ "success": true, "marked_read": ids.len() }))
    }
}

#[async_trait]
impl ToolEndpoint for EmailEndpoint {
    fn peer(&self) -> PeerId {
        PeerId::Email
    }

    fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, arguments: &Value) -> Result<Value, UpstreamError> {
        match tool {
            "get_recent_emails" => self.recent_emails(arguments).await,
            "send_email" => self.send_email(arguments).await,
            "search_emails" => self.search(arguments).await,
            "get_email_thread" => self.thread(arguments).await,
            "mark_as_read" => self.mark_as_read(arguments).await,
            other => Err(UpstreamError::not_found(self.upstream.name(), other)),
        }
    }

    fn fallback(&self, tool: &str, arguments: &Value, error: &UpstreamError) -> Value {
        mock::payload(tool, arguments, &error.to_string())
    }
}
