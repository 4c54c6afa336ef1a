use crate::domain::ToolDescriptor;
use crate::infrastructure::endpoints::period::PERIOD_NAMES;
use serde_json::{Value, json};

fn object(properties: Value, required: &[&str]) -> Value {
    if required.is_empty() {
        json!({ "type": "object", "properties": properties })
    } else {
        json!({ "type": "object", "properties": properties, "required": required })
    }
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn flag(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn choice(values: &[&str], description: &str) -> Value {
    json!({ "type": "string", "enum": values, "description": description })
}

fn period(description: &str) -> Value {
    choice(&PERIOD_NAMES, description)
}

/// The one accounting catalog served by this endpoint.
pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "get_customers",
            "Get comprehensive customer list with contact details, balances, and outstanding invoices",
            object(
                json!({
                    "active_only": flag("Only return active customers"),
                    "include_balance": flag("Include customer balance information"),
                    "include_outstanding_invoices": flag("Include outstanding invoices for each customer")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_customer_details",
            "Get detailed information for a specific customer including payment history and outstanding balances",
            object(json!({ "customer_id": string("QuickBooks customer ID") }), &["customer_id"]),
        ),
        ToolDescriptor::new(
            "get_vendors",
            "Get list of vendors/suppliers with outstanding bills",
            object(
                json!({
                    "active_only": flag("Only return active vendors"),
                    "include_bills": flag("Include outstanding bills for each vendor")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_invoices",
            "Get invoice list including open, paid, and overdue invoices",
            object(
                json!({
                    "status": choice(&["all", "open", "paid", "overdue"], "Filter by invoice status"),
                    "date_from": string("Start date filter (YYYY-MM-DD)"),
                    "date_to": string("End date filter (YYYY-MM-DD)"),
                    "customer_id": string("Filter by specific customer")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_outstanding_invoices",
            "Get list of outstanding/unpaid invoices",
            object(
                json!({
                    "overdue_only": flag("Only return overdue invoices"),
                    "include_customer_details": flag("Include customer contact information")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "create_invoice",
            "Create a new invoice with line items",
            object(
                json!({
                    "customer_id": string("QuickBooks customer ID"),
                    "line_items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "description": { "type": "string" },
                                "quantity": { "type": "number" },
                                "rate": { "type": "number" },
                                "item_id": string("QuickBooks item ID")
                            },
                            "required": ["quantity", "rate"]
                        }
                    },
                    "due_date": string("Invoice due date (YYYY-MM-DD)"),
                    "memo": string("Invoice memo/notes")
                }),
                &["customer_id", "line_items"],
            ),
        ),
        ToolDescriptor::new(
            "get_payments",
            "Get payments with amounts, dates, and payment methods",
            object(
                json!({
                    "date_from": string("Start date filter (YYYY-MM-DD)"),
                    "date_to": string("End date filter (YYYY-MM-DD)"),
                    "payment_method": choice(
                        &["all", "check", "credit_card", "cash", "bank_transfer"],
                        "Filter by payment method"
                    ),
                    "customer_id": string("Filter by specific customer")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_estimates",
            "Get estimates and quotes with their status",
            object(
                json!({
                    "status": choice(
                        &["all", "draft", "sent", "accepted", "declined"],
                        "Filter by estimate status"
                    ),
                    "customer_id": string("Filter by specific customer")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_expenses",
            "Get expenses including credit card charges and cash expenses",
            object(
                json!({
                    "date_from": string("Start date filter (YYYY-MM-DD)"),
                    "date_to": string("End date filter (YYYY-MM-DD)"),
                    "category": string("Filter by expense category"),
                    "payment_method": choice(
                        &["all", "credit_card", "cash", "check", "bank_transfer"],
                        "Filter by payment method"
                    )
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_expenses_summary",
            "Get expenses summary for a period with category breakdown",
            object(
                json!({ "period": period("Time period for expenses summary") }),
                &["period"],
            ),
        ),
        ToolDescriptor::new(
            "get_revenue_summary",
            "Get revenue summary for a period with breakdown",
            object(
                json!({ "period": period("Time period for revenue summary") }),
                &["period"],
            ),
        ),
        ToolDescriptor::new(
            "get_profit_loss",
            "Get Profit & Loss report for a date range",
            object(
                json!({
                    "date_from": string("Start date (YYYY-MM-DD)"),
                    "date_to": string("End date (YYYY-MM-DD)")
                }),
                &["date_from", "date_to"],
            ),
        ),
        ToolDescriptor::new(
            "get_accounts",
            "Get chart of accounts with balances",
            object(
                json!({
                    "account_type": choice(
                        &["all", "Bank", "Income", "Expense", "Asset", "Liability", "Equity"],
                        "Filter by account type"
                    ),
                    "active_only": flag("Only return active accounts")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_account_balance",
            "Get current balance for a specific account",
            object(json!({ "account_id": string("QuickBooks account ID") }), &["account_id"]),
        ),
        ToolDescriptor::new(
            "get_transactions",
            "Get journal entries, deposits, transfers, and other transactions",
            object(
                json!({
                    "transaction_type": choice(
                        &["all", "JournalEntry", "Deposit", "Transfer", "Bill", "Payment"],
                        "Filter by transaction type"
                    ),
                    "date_from": string("Start date filter (YYYY-MM-DD)"),
                    "date_to": string("End date filter (YYYY-MM-DD)"),
                    "account_id": string("Filter by specific account")
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            "get_items",
            "Get items and services available for invoicing",
            object(
                json!({
                    "item_type": choice(
                        &["all", "Service", "NonInventory", "Inventory"],
                        "Filter by item type"
                    ),
                    "active_only": flag("Only return active items")
                }),
                &[],
            ),
        ),
    ]
}
