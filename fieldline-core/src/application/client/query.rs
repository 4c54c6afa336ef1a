//! Convenience calls the dashboard routes use.

use super::{ClientError, IntegrationClient, ToolOutcome};
use crate::application::cancel::CancelToken;
use crate::application::fallback;
use crate::constants::RECENT_EMAIL_QUERY;
use crate::domain::{PeerId, Provenance};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

pub const RECENT_EMAIL_LIMIT: usize = 5;
pub const RECENT_SMS_LIMIT: u64 = 10;
pub const RECENT_CUSTOMER_LIMIT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinancialSummary {
    pub revenue: ToolOutcome,
    pub invoices: ToolOutcome,
    pub expenses: ToolOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Communications {
    #[schema(value_type = Vec<Object>)]
    pub emails: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub sms: Vec<Value>,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerOverview {
    pub customer: ToolOutcome,
    pub jobs: ToolOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmailQuery {
    pub limit: usize,
    pub query: Option<String>,
    pub include_body: bool,
}

impl Default for EmailQuery {
    fn default() -> Self {
        Self {
            limit: RECENT_EMAIL_LIMIT,
            query: None,
            include_body: false,
        }
    }
}

impl EmailQuery {
    pub(crate) fn arguments(&self) -> Value {
        json!({
            "limit": self.limit,
            "query": self.query.as_deref().unwrap_or(RECENT_EMAIL_QUERY),
            "include_body": self.include_body,
        })
    }
}

pub(crate) fn today_jobs_args() -> Value {
    json!({
        "date": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        "status": "scheduled",
    })
}

pub(crate) fn recent_customers_args() -> Value {
    json!({ "limit": RECENT_CUSTOMER_LIMIT, "sort": "updated_at", "order": "desc" })
}

pub(crate) fn current_month() -> Value {
    json!({ "period": "current_month" })
}

/// Emails from a `get_recent_emails` outcome, or the canned inbox when the
/// live call did not happen.
pub(crate) fn inbox_from(outcome: &ToolOutcome, limit: usize, forced: bool) -> (Vec<Value>, Provenance) {
    let emails = outcome.payload.get("emails").and_then(Value::as_array);
    match emails {
        Some(emails) if outcome.error.is_none() && !forced => (emails.clone(), outcome.provenance),
        _ => (fallback::mock_inbox(limit), Provenance::Mock),
    }
}

impl IntegrationClient {
    pub async fn schedule_for_today(&self, cancel: Option<&CancelToken>) -> ToolOutcome {
        self.invoke_or_fallback(PeerId::Scheduling, "get_jobs", today_jobs_args(), cancel)
            .await
    }

    pub async fn recent_customers(&self, cancel: Option<&CancelToken>) -> ToolOutcome {
        self.invoke_or_fallback(
            PeerId::Scheduling,
            "get_customers",
            recent_customers_args(),
            cancel,
        )
        .await
    }

    /// Revenue, outstanding invoices and expenses, fetched concurrently.
    pub async fn financial_summary(&self, cancel: Option<&CancelToken>) -> FinancialSummary {
        let (revenue, invoices, expenses) = futures::join!(
            self.invoke_or_fallback(PeerId::Accounting, "get_revenue_summary", current_month(), cancel),
            self.invoke_or_fallback(PeerId::Accounting, "get_outstanding_invoices", json!({}), cancel),
            self.invoke_or_fallback(PeerId::Accounting, "get_expenses_summary", current_month(), cancel),
        );
        FinancialSummary {
            revenue,
            invoices,
            expenses,
        }
    }

    pub async fn get_emails(&self, query: &EmailQuery, cancel: Option<&CancelToken>) -> Communications {
        let outcome = self
            .invoke_or_fallback(PeerId::Email, "get_recent_emails", query.arguments(), cancel)
            .await;
        let (emails, source) = inbox_from(&outcome, query.limit, self.force_mock_data());
        Communications {
            emails,
            sms: Vec::new(),
            source,
            error: outcome.error,
        }
    }

    /// Recent emails and text messages. Provenance follows the emails.
    pub async fn recent_communications(&self, cancel: Option<&CancelToken>) -> Communications {
        let query = EmailQuery::default();
        let (mut communications, sms) = futures::join!(
            self.get_emails(&query, cancel),
            self.invoke_or_fallback(
                PeerId::Messaging,
                "get_recent_messages",
                json!({ "limit": RECENT_SMS_LIMIT }),
                cancel,
            ),
        );
        communications.sms = sms
            .payload
            .get("messages")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        communications
    }

    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Value, ClientError> {
        self.invoke_payload(
            PeerId::Email,
            "send_email",
            json!({ "to": to, "subject": subject, "body": body }),
            cancel,
        )
        .await
    }

    pub async fn send_sms(
        &self,
        to: &str,
        message: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Value, ClientError> {
        self.invoke_payload(
            PeerId::Messaging,
            "send_sms",
            json!({ "to": to, "message": message }),
            cancel,
        )
        .await
    }

    /// Customer record with job history.
    pub async fn customer_overview(
        &self,
        customer_id: &str,
        cancel: Option<&CancelToken>,
    ) -> CustomerOverview {
        let (customer, jobs) = futures::join!(
            self.invoke_or_fallback(PeerId::Scheduling, "get_customer", json!({ "id": customer_id }), cancel),
            self.invoke_or_fallback(
                PeerId::Scheduling,
                "get_customer_jobs",
                json!({ "customer_id": customer_id }),
                cancel,
            ),
        );
        CustomerOverview { customer, jobs }
    }
}
