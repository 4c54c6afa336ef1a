//! # Context aggregation
//!
//! Builds a [`BusinessContext`] from four independent reads issued
//! concurrently: today's schedule, recent customers, the financial summary
//! and recent communications. All four are awaited together, so the build
//! takes as long as the slowest read.
//!
//! A read that fails leaves a neutral value in its field, marks the field
//! [`FieldSource::Unavailable`] and records the reason in `errors`. It never
//! fails the build. Communications are the exception: they fall back to the
//! canned inbox so the assistant always has something to show.

pub mod context;
pub mod intent;

pub use context::{BusinessContext, CallerContext, ChatMessage, FieldSource, SourceFlags};
pub use intent::Intent;

use super::cancel::CancelToken;
use super::client::query::{current_month, recent_customers_args, today_jobs_args};
use super::client::{Communications, EmailQuery, IntegrationClient};
use super::fallback;
use crate::domain::{PeerId, Provenance};
use chrono::Utc;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ContextAggregator {
    client: Arc<IntegrationClient>,
}

struct Field {
    value: Value,
    source: FieldSource,
    error: Option<String>,
}

impl ContextAggregator {
    pub fn new(client: Arc<IntegrationClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<IntegrationClient> {
        &self.client
    }

    pub async fn build_context(
        &self,
        caller: &CallerContext,
        current_message: Option<&str>,
        cancel: Option<&CancelToken>,
    ) -> BusinessContext {
        let intent = intent::classify(intent::message_to_classify(current_message, caller));
        debug!(?intent, "Building business context");

        let (schedule, customers, financials, communications) = futures::join!(
            self.field(
                PeerId::Scheduling,
                "get_jobs",
                today_jobs_args(),
                json!({ "jobs": [] }),
                cancel
            ),
            self.field(
                PeerId::Scheduling,
                "get_customers",
                recent_customers_args(),
                json!({ "customers": [] }),
                cancel
            ),
            self.financials(cancel),
            self.communications(intent, cancel),
        );

        let mut errors = BTreeMap::new();
        for (name, error) in [
            ("schedule", &schedule.error),
            ("customers", &customers.error),
            ("financials", &financials.error),
            ("communications", &communications.error),
        ] {
            if let Some(error) = error {
                errors.insert(name.to_string(), error.clone());
            }
        }

        BusinessContext {
            source_flags: SourceFlags {
                schedule: schedule.source,
                customers: customers.source,
                financials: financials.source,
                communications: communications.source.into(),
            },
            urgent_email_count: context::count_urgent(&communications.emails),
            schedule: schedule.value,
            customers: customers.value,
            financials: financials.value,
            communications,
            timestamp: Utc::now(),
            errors,
            intent,
        }
    }

    async fn field(
        &self,
        peer: PeerId,
        tool: &str,
        arguments: Value,
        neutral: Value,
        cancel: Option<&CancelToken>,
    ) -> Field {
        if self.client.force_mock_data() {
            return Field {
                value: fallback::mock_payload(peer, tool, &arguments, "mock data forced by configuration"),
                source: FieldSource::Mock,
                error: None,
            };
        }
        match self.client.invoke_payload(peer, tool, arguments, cancel).await {
            Ok(payload) => Field {
                source: Provenance::detect(&payload).into(),
                value: payload,
                error: None,
            },
            Err(err) => {
                warn!(%peer, tool, %err, "Context read failed, leaving field empty");
                Field {
                    value: neutral,
                    source: FieldSource::Unavailable,
                    error: Some(err.user_message()),
                }
            }
        }
    }

    async fn financials(&self, cancel: Option<&CancelToken>) -> Field {
        let (revenue, invoices, expenses) = futures::join!(
            self.field(PeerId::Accounting, "get_revenue_summary", current_month(), Value::Null, cancel),
            self.field(PeerId::Accounting, "get_outstanding_invoices", json!({}), Value::Null, cancel),
            self.field(PeerId::Accounting, "get_expenses_summary", current_month(), Value::Null, cancel),
        );
        let parts = [("revenue", revenue), ("invoices", invoices), ("expenses", expenses)];

        let failures: Vec<String> = parts
            .iter()
            .filter_map(|(name, part)| part.error.as_ref().map(|error| format!("{name}: {error}")))
            .collect();
        let source = if !failures.is_empty() {
            FieldSource::Unavailable
        } else if parts.iter().any(|(_, part)| part.source == FieldSource::Mock) {
            FieldSource::Mock
        } else {
            FieldSource::Real
        };
        let value = Value::Object(
            parts
                .into_iter()
                .map(|(name, part)| (name.to_string(), part.value))
                .collect(),
        );

        Field {
            value,
            source,
            error: (!failures.is_empty()).then(|| failures.join("; ")),
        }
    }

    async fn communications(&self, intent: Intent, cancel: Option<&CancelToken>) -> Communications {
        match intent {
            Intent::Email { limit } => {
                let query = EmailQuery {
                    limit,
                    query: None,
                    include_body: true,
                };
                self.client.get_emails(&query, cancel).await
            }
            Intent::General => self.client.recent_communications(cancel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::client::ClientConfig;

    fn aggregator(force_mock: bool) -> ContextAggregator {
        let config = ClientConfig::new(Vec::new()).with_force_mock_data(force_mock);
        ContextAggregator::new(Arc::new(IntegrationClient::new(config)))
    }

    #[tokio::test]
    async fn unavailable_peers_leave_neutral_fields() {
        let context = aggregator(false)
            .build_context(&CallerContext::default(), Some("how is today looking?"), None)
            .await;
        assert_eq!(context.schedule, json!({ "jobs": [] }));
        assert_eq!(context.source_flags.schedule, FieldSource::Unavailable);
        assert_eq!(context.financials["revenue"], Value::Null);
        assert_eq!(context.source_flags.communications, FieldSource::Mock);
        assert_eq!(context.communications.emails.len(), 5);
        assert_eq!(context.urgent_email_count, 1);
        assert_eq!(
            context.errors.keys().map(String::as_str).collect::<Vec<_>>(),
            ["communications", "customers", "financials", "schedule"]
        );
        assert_eq!(context.intent, Intent::General);
    }

    #[tokio::test]
    async fn email_intent_changes_the_communications_read() {
        let caller = CallerContext {
            previous_messages: vec![ChatMessage::new("user", "show me 3 emails")],
        };
        let context = aggregator(false).build_context(&caller, None, None).await;
        assert_eq!(context.intent, Intent::Email { limit: 3 });
        assert!(context.is_email_request());
        assert_eq!(context.communications.emails.len(), 3);
    }

    #[tokio::test]
    async fn forced_mock_fills_every_field() {
        let context = aggregator(true)
            .build_context(&CallerContext::default(), None, None)
            .await;
        assert!(context.errors.is_empty());
        assert_eq!(context.source_flags.schedule, FieldSource::Mock);
        assert_eq!(context.source_flags.financials, FieldSource::Mock);
        assert!(context.schedule["jobs"].is_array());
        assert_eq!(context.financials["invoices"]["total_outstanding"], json!(625));
    }
}
