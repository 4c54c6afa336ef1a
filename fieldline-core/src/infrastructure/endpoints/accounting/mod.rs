//! Accounting endpoint backed by QuickBooks Online.
//!
//! Most reads go through the QuickBooks query language (`SELECT * FROM
//! Invoice WHERE ...`), built by [`Select`]. Summaries read the Profit and
//! Loss report.

mod catalog;
pub(crate) mod mock;
mod report;

use crate::application::endpoint::{ToolEndpoint, UpstreamError, arg_bool, arg_str};
use crate::domain::{PeerId, ToolDescriptor};
use crate::infrastructure::endpoints::period::Period;
use crate::infrastructure::upstream::{HttpUpstream, Upstream, UpstreamAuth, UpstreamRequest};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::future::{join_all, try_join_all};
use serde_json::{Value, json};
use std::env;
use std::sync::Arc;

const PRODUCTION_HOST: &str = "https://quickbooks.api.intuit.com";
const SANDBOX_HOST: &str = "https://sandbox-quickbooks.api.intuit.com";
const TRANSACTION_ENTITIES: [&str; 5] = ["JournalEntry", "Deposit", "Transfer", "Bill", "Payment"];

/// Builder for a QuickBooks query statement.
#[derive(Debug, Clone)]
pub(crate) struct Select {
    entity: &'static str,
    conditions: Vec<String>,
    order_by: Option<&'static str>,
}

impl Select {
    pub(crate) fn from(entity: &'static str) -> Self {
        Self {
            entity,
            conditions: Vec::new(),
            order_by: None,
        }
    }

    pub(crate) fn filter(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub(crate) fn filter_if(self, enabled: bool, condition: &str) -> Self {
        if enabled { self.filter(condition) } else { self }
    }

    /// `field op 'value'` when the value is present.
    pub(crate) fn compare(self, field: &str, op: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.filter(format!("{field} {op} '{}'", quote(value))),
            None => self,
        }
    }

    pub(crate) fn order_by(mut self, clause: &'static str) -> Self {
        self.order_by = Some(clause);
        self
    }

    pub(crate) fn build(&self) -> String {
        let mut statement = format!("SELECT * FROM {}", self.entity);
        if !self.conditions.is_empty() {
            statement.push_str(" WHERE ");
            statement.push_str(&self.conditions.join(" AND "));
        }
        if let Some(order) = self.order_by {
            statement.push_str(" ORDER BY ");
            statement.push_str(order);
        }
        statement
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn rows(response: &Value, entity: &str) -> Vec<Value> {
    response
        .get("QueryResponse")
        .and_then(|r| r.get(entity))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn sum(rows: &[Value], field: &str) -> f64 {
    rows.iter().filter_map(|row| row.get(field).and_then(Value::as_f64)).sum()
}

fn has_balance(row: &Value) -> bool {
    row.get("Balance").and_then(Value::as_f64).unwrap_or(0.0) > 0.0
}

/// True when any nested `AccountRef` points at `id`.
fn references_account(value: &Value, id: &str) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(key, inner)| {
            (key == "AccountRef" && inner.get("value").and_then(Value::as_str) == Some(id))
                || references_account(inner, id)
        }),
        Value::Array(items) => items.iter().any(|item| references_account(item, id)),
        _ => false,
    }
}

fn method_matches(row: &Value, wanted: &str) -> bool {
    if wanted == "all" {
        return true;
    }
    let name = row
        .pointer("/PaymentMethodRef/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
        .replace(' ', "_");
    name == wanted
}

pub struct AccountingEndpoint {
    upstream: Arc<dyn Upstream>,
    tools: Vec<ToolDescriptor>,
}

impl AccountingEndpoint {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            tools: catalog::tools(),
        }
    }

    /// Reads `QUICKBOOKS_ACCESS_TOKEN`, `QUICKBOOKS_COMPANY_ID` and `QUICKBOOKS_SANDBOX`.
    pub fn from_env() -> Self {
        let host = match env::var("QUICKBOOKS_SANDBOX").as_deref() {
            Ok("true") => SANDBOX_HOST,
            _ => PRODUCTION_HOST,
        };
        let company = env::var("QUICKBOOKS_COMPANY_ID").ok();
        // Without a company id there is no usable URL, so treat it as missing credentials.
        let token = company
            .as_ref()
            .and_then(|_| env::var("QUICKBOOKS_ACCESS_TOKEN").ok());
        let upstream = HttpUpstream::new(
            "quickbooks",
            format!("{host}/v3/company/{}", company.unwrap_or_default()),
            UpstreamAuth::Bearer(token),
        );
        Self::new(Arc::new(upstream))
    }

    async fn query(&self, select: Select) -> Result<Vec<Value>, UpstreamError> {
        let request = UpstreamRequest::get("query").query("query", select.build());
        let response = self.upstream.send(request).await?;
        Ok(rows(&response, select.entity))
    }

    async fn first(&self, select: Select, what: &str) -> Result<Value, UpstreamError> {
        self.query(select)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::not_found(self.upstream.name(), what))
    }

    async fn profit_and_loss(&self, start: &str, end: &str) -> Result<Value, UpstreamError> {
        let request = UpstreamRequest::get("reports/ProfitAndLoss")
            .query("start_date", start)
            .query("end_date", end);
        self.upstream.send(request).await
    }

    async fn customers(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let active_only = arg_bool(arguments, "active_only").unwrap_or(true);
        let include_balance = arg_bool(arguments, "include_balance").unwrap_or(false);
        let include_invoices = arg_bool(arguments, "include_outstanding_invoices").unwrap_or(false);

        let mut customers = self
            .query(Select::from("Customer").filter_if(active_only, "Active = true"))
            .await?;
        if !include_balance {
            for customer in &mut customers {
                if let Some(map) = customer.as_object_mut() {
                    map.remove("Balance");
                }
            }
        }
        if include_invoices {
            let lookups = customers.iter().map(|customer| {
                let id = customer.get("Id").and_then(Value::as_str).unwrap_or_default().to_string();
                async move {
                    self.query(
                        Select::from("Invoice")
                            .compare("CustomerRef", "=", Some(id.as_str()))
                            .filter("Balance > '0'"),
                    )
                    .await
                    .unwrap_or_default()
                }
            });
            let invoices = join_all(lookups).await;
            for (customer, open) in customers.iter_mut().zip(invoices) {
                customer["OutstandingInvoices"] = Value::Array(open);
            }
        }

        Ok(json!({
            "total_count": customers.len(),
            "customers": customers,
            "include_balance": include_balance,
            "include_outstanding_invoices": include_invoices,
        }))
    }

    async fn customer_details(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let id = arg_str(arguments, "customer_id");
        let customer = self
            .first(Select::from("Customer").compare("Id", "=", id), "customer")
            .await?;
        let (invoices, payments) = futures::try_join!(
            self.query(
                Select::from("Invoice")
                    .compare("CustomerRef", "=", id)
                    .order_by("TxnDate DESC")
            ),
            self.query(
                Select::from("Payment")
                    .compare("CustomerRef", "=", id)
                    .order_by("TxnDate DESC")
            ),
        )?;
        let open: Vec<Value> = invoices.iter().filter(|inv| has_balance(inv)).cloned().collect();
        Ok(json!({
            "customer": customer,
            "invoices": {
                "total": invoices.len(),
                "outstanding": open.len(),
                "total_outstanding_amount": sum(&open, "Balance"),
                "recent": invoices.iter().take(5).collect::<Vec<_>>(),
            },
            "payments": {
                "total": payments.len(),
                "total_amount": sum(&payments, "TotalAmt"),
                "recent": payments.iter().take(5).collect::<Vec<_>>(),
            },
        }))
    }

    async fn vendors(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let active_only = arg_bool(arguments, "active_only").unwrap_or(true);
        let include_bills = arg_bool(arguments, "include_bills").unwrap_or(false);
        let mut vendors = self
            .query(Select::from("Vendor").filter_if(active_only, "Active = true"))
            .await?;
        if include_bills {
            let lookups = vendors.iter().map(|vendor| {
                let id = vendor.get("Id").and_then(Value::as_str).unwrap_or_default().to_string();
                async move {
                    self.query(
                        Select::from("Bill")
                            .compare("VendorRef", "=", Some(id.as_str()))
                            .filter("Balance > '0'"),
                    )
                    .await
                    .unwrap_or_default()
                }
            });
            let bills = join_all(lookups).await;
            for (vendor, open) in vendors.iter_mut().zip(bills) {
                vendor["OutstandingBills"] = Value::Array(open);
            }
        }
        Ok(json!({
            "total_count": vendors.len(),
            "vendors": vendors,
            "include_bills": include_bills,
        }))
    }

    async fn invoices(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let status = arg_str(arguments, "status").unwrap_or("all");
        let today = Utc::now().date_naive().to_string();
        let select = match status {
            "open" => Select::from("Invoice").filter("Balance > '0'"),
            "paid" => Select::from("Invoice").filter("Balance = '0'"),
            "overdue" => Select::from("Invoice")
                .filter("Balance > '0'")
                .compare("DueDate", "<", Some(today.as_str())),
            _ => Select::from("Invoice"),
        };
        let invoices = self
            .query(
                select
                    .compare("TxnDate", ">=", arg_str(arguments, "date_from"))
                    .compare("TxnDate", "<=", arg_str(arguments, "date_to"))
                    .compare("CustomerRef", "=", arg_str(arguments, "customer_id"))
                    .order_by("TxnDate DESC"),
            )
            .await?;
        let open: Vec<Value> = invoices.iter().filter(|inv| has_balance(inv)).cloned().collect();
        Ok(json!({
            "total_count": invoices.len(),
            "total_amount": sum(&invoices, "TotalAmt"),
            "outstanding_amount": sum(&open, "Balance"),
            "invoices": invoices,
            "filters": {
                "status": status,
                "date_from": arg_str(arguments, "date_from"),
                "date_to": arg_str(arguments, "date_to"),
                "customer_id": arg_str(arguments, "customer_id"),
            },
        }))
    }

    async fn outstanding_invoices(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let overdue_only = arg_bool(arguments, "overdue_only").unwrap_or(false);
        let with_customer = arg_bool(arguments, "include_customer_details").unwrap_or(false);
        let today = Utc::now().date_naive().to_string();

        let mut select = Select::from("Invoice").filter("Balance > '0'");
        if overdue_only {
            select = select.compare("DueDate", "<", Some(today.as_str()));
        }
        let mut invoices = self.query(select).await?;
        for invoice in &mut invoices {
            let overdue = invoice
                .get("DueDate")
                .and_then(Value::as_str)
                .is_some_and(|due| due < today.as_str());
            invoice["overdue"] = Value::Bool(overdue);
        }

        if with_customer {
            let lookups = invoices.iter().map(|invoice| {
                let id = invoice
                    .pointer("/CustomerRef/value")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                async move {
                    self.first(Select::from("Customer").compare("Id", "=", Some(id.as_str())), "customer")
                        .await
                        .unwrap_or(Value::Null)
                }
            });
            let details = join_all(lookups).await;
            for (invoice, customer) in invoices.iter_mut().zip(details) {
                invoice["CustomerDetails"] = customer;
            }
        }

        Ok(json!({
            "total_outstanding": sum(&invoices, "Balance"),
            "invoices": invoices,
            "overdue_only": overdue_only,
            "include_customer_details": with_customer,
        }))
    }

    async fn create_invoice(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let lines: Vec<Value> = arguments
            .get("line_items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let quantity = item.get("quantity").and_then(Value::as_f64).unwrap_or(0.0);
                let rate = item.get("rate").and_then(Value::as_f64).unwrap_or(0.0);
                json!({
                    "LineNum": index + 1,
                    "Amount": quantity * rate,
                    "Description": item.get("description"),
                    "DetailType": "SalesItemLineDetail",
                    "SalesItemLineDetail": {
                        "ItemRef": { "value": arg_str(item, "item_id").unwrap_or("1") },
                        "Qty": quantity,
                        "UnitPrice": rate,
                    },
                })
            })
            .collect();
        let due_date = arg_str(arguments, "due_date").map(str::to_string).unwrap_or_else(|| {
            (Utc::now().date_naive() + Duration::days(30)).to_string()
        });
        let mut body = json!({
            "Line": lines,
            "CustomerRef": { "value": arg_str(arguments, "customer_id") },
            "DueDate": due_date,
        });
        if let Some(memo) = arg_str(arguments, "memo") {
            body["CustomerMemo"] = json!({ "value": memo });
        }

        let response = self
            .upstream
            .send(UpstreamRequest::post_json("invoice", body))
            .await?;
        let invoice = response
            .get("Invoice")
            .cloned()
            .ok_or_else(|| UpstreamError::invalid_response(self.upstream.name(), "no Invoice in response"))?;
        Ok(json!({ "success": true, "invoice": invoice }))
    }

    async fn payments(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let method = arg_str(arguments, "payment_method").unwrap_or("all");
        let payments: Vec<Value> = self
            .query(
                Select::from("Payment")
                    .compare("TxnDate", ">=", arg_str(arguments, "date_from"))
                    .compare("TxnDate", "<=", arg_str(arguments, "date_to"))
                    .compare("CustomerRef", "=", arg_str(arguments, "customer_id"))
                    .order_by("TxnDate DESC"),
            )
            .await?
            .into_iter()
            .filter(|payment| method_matches(payment, method))
            .collect();
        Ok(json!({
            "total_count": payments.len(),
            "total_amount": sum(&payments, "TotalAmt"),
            "payments": payments,
        }))
    }

    async fn estimates(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let status = match arg_str(arguments, "status") {
            Some("draft") => Some("Pending"),
            Some("sent") => Some("Pending"),
            Some("accepted") => Some("Accepted"),
            Some("declined") => Some("Rejected"),
            _ => None,
        };
        let estimates = self
            .query(
                Select::from("Estimate")
                    .compare("TxnStatus", "=", status)
                    .compare("CustomerRef", "=", arg_str(arguments, "customer_id"))
                    .order_by("TxnDate DESC"),
            )
            .await?;
        Ok(json!({
            "total_count": estimates.len(),
            "total_value": sum(&estimates, "TotalAmt"),
            "estimates": estimates,
        }))
    }

    async fn expenses(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let method = arg_str(arguments, "payment_method").unwrap_or("all");
        let expenses: Vec<Value> = self
            .query(
                Select::from("Purchase")
                    .compare("TxnDate", ">=", arg_str(arguments, "date_from"))
                    .compare("TxnDate", "<=", arg_str(arguments, "date_to"))
                    .compare("AccountRef", "=", arg_str(arguments, "category"))
                    .order_by("TxnDate DESC"),
            )
            .await?
            .into_iter()
            .filter(|expense| method_matches(expense, method))
            .collect();
        Ok(json!({
            "total_count": expenses.len(),
            "total_amount": sum(&expenses, "TotalAmt"),
            "expenses": expenses,
        }))
    }

    async fn summary(&self, arguments: &Value, group: &str, total_key: &str) -> Result<Value, UpstreamError> {
        let name = arg_str(arguments, "period").unwrap_or("current_month");
        let period = name.parse::<Period>().unwrap_or(Period::CurrentMonth);
        let range = period.date_range(Utc::now().date_naive());
        let report = self
            .profit_and_loss(&range.start.to_string(), &range.end.to_string())
            .await?;
        let section = report::section(&report, group).ok_or_else(|| {
            UpstreamError::invalid_response(self.upstream.name(), format!("report has no {group} section"))
        })?;
        let mut summary = json!({
            "period": name,
            "breakdown": section.breakdown,
            "date_range": range,
        });
        summary[total_key] = json!(section.total);
        Ok(summary)
    }

    async fn accounts(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let account_type = arg_str(arguments, "account_type").filter(|t| *t != "all");
        let active_only = arg_bool(arguments, "active_only").unwrap_or(true);
        let accounts = self
            .query(
                Select::from("Account")
                    .compare("AccountType", "=", account_type)
                    .filter_if(active_only, "Active = true"),
            )
            .await?;
        Ok(json!({ "total_count": accounts.len(), "accounts": accounts }))
    }

    async fn account_balance(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let account = self
            .first(
                Select::from("Account").compare("Id", "=", arg_str(arguments, "account_id")),
                "account",
            )
            .await?;
        Ok(json!({
            "balance": account.get("CurrentBalance").and_then(Value::as_f64).unwrap_or(0.0),
            "account_type": account.get("AccountType"),
            "currency": account.pointer("/CurrencyRef/value").and_then(Value::as_str).unwrap_or("USD"),
            "account": account,
        }))
    }

    async fn transactions(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let wanted = arg_str(arguments, "transaction_type").unwrap_or("all");
        let entities: Vec<&'static str> = TRANSACTION_ENTITIES
            .into_iter()
            .filter(|entity| wanted == "all" || *entity == wanted)
            .collect();
        let lookups = entities.iter().map(|entity| {
            self.query(
                Select::from(*entity)
                    .compare("TxnDate", ">=", arg_str(arguments, "date_from"))
                    .compare("TxnDate", "<=", arg_str(arguments, "date_to"))
                    .order_by("TxnDate DESC"),
            )
        });
        let account = arg_str(arguments, "account_id");
        let mut transactions = Vec::new();
        for (entity, found) in entities.iter().zip(try_join_all(lookups).await?) {
            for mut txn in found {
                if account.is_some_and(|id| !references_account(&txn, id)) {
                    continue;
                }
                txn["TxnType"] = json!(entity);
                transactions.push(txn);
            }
        }
        Ok(json!({ "total_count": transactions.len(), "transactions": transactions }))
    }

    async fn items(&self, arguments: &Value) -> Result<Value, UpstreamError> {
        let item_type = arg_str(arguments, "item_type").filter(|t| *t != "all");
        let active_only = arg_bool(arguments, "active_only").unwrap_or(true);
        let items = self
            .query(
                Select::from("Item")
                    .compare("Type", "=", item_type)
                    .filter_if(active_only, "Active = true"),
            )
            .await?;
        Ok(json!({ "total_count": items.len(), "items": items }))
    }
}

#[async_trait]
impl ToolEndpoint for AccountingEndpoint {
    fn peer(&self) -> PeerId {
        PeerId::Accounting
    }

    fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, arguments: &Value) -> Result<Value, UpstreamError> {
        match tool {
            "get_customers" => self.customers(arguments).await,
            "get_customer_details" => self.customer_details(arguments).await,
            "get_vendors" => self.vendors(arguments).await,
            "get_invoices" => self.invoices(arguments).await,
            "get_outstanding_invoices" => self.outstanding_invoices(arguments).await,
            "create_invoice" => self.create_invoice(arguments).await,
            "get_payments" => self.payments(arguments).await,
            "get_estimates" => self.estimates(arguments).await,
            "get_expenses" => self.expenses(arguments).await,
            "get_expenses_summary" => self.summary(arguments, "Expenses", "total_expenses").await,
            "get_revenue_summary" => self.summary(arguments, "Income", "total_revenue").await,
            "get_profit_loss" => {
                let from = arg_str(arguments, "date_from").unwrap_or_default();
                let to = arg_str(arguments, "date_to").unwrap_or_default();
                let report = self.profit_and_loss(from, to).await?;
                Ok(json!({ "profit_loss": report, "date_range": { "from": from, "to": to } }))
            }
            "get_accounts" => self.accounts(arguments).await,
            "get_account_balance" => self.account_balance(arguments).await,
            "get_transactions" => self.transactions(arguments).await,
            "get_items" => self.items(arguments).await,
            other => Err(UpstreamError::not_found(self.upstream.name(), other)),
        }
    }

    fn fallback(&self, tool: &str, arguments: &Value, error: &UpstreamError) -> Value {
        mock::payload(tool, arguments, &error.to_string())
    }
}
