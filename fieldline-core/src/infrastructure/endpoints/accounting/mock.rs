use crate::application::endpoint::{arg_bool, arg_str, tag_mock};
use crate::infrastructure::endpoints::period::Period;
use chrono::Utc;
use serde_json::{Value, json};

pub const NOTE: &str = "Mock data - QuickBooks API unavailable";
const INVOICE_NOTE: &str = "Invoice creation failed - using mock response";

pub(crate) fn payload(tool: &str, arguments: &Value, error: &str) -> Value {
    let body = match tool {
        "get_customers" => customers(arguments),
        "get_customer_details" => customer_details(arg_str(arguments, "customer_id").unwrap_or("1")),
        "get_vendors" => json!({
            "vendors": [
                { "Id": "1", "Name": "ABC Supplies", "CompanyName": "ABC Supplies Inc." },
                { "Id": "2", "Name": "XYZ Equipment", "CompanyName": "XYZ Equipment Co." }
            ],
            "total_count": 2
        }),
        "get_invoices" => json!({
            "invoices": [
                invoice("1", "INV-001", "John Smith", 350, 350, "2024-01-20"),
                invoice("2", "INV-002", "Sarah Johnson", 275, 0, "2024-01-15")
            ],
            "total_count": 2,
            "total_amount": 625,
            "outstanding_amount": 350
        }),
        "get_outstanding_invoices" => outstanding_invoices(arguments),
        "create_invoice" => {
            return tag_mock(
                json!({ "success": false, "error": error }),
                INVOICE_NOTE,
            );
        }
        "get_payments" => json!({
            "payments": [
                { "Id": "1", "TotalAmt": 800, "TxnDate": "2024-01-15", "PaymentMethodRef": { "name": "Check" } },
                { "Id": "2", "TotalAmt": 400, "TxnDate": "2024-01-10", "PaymentMethodRef": { "name": "Credit Card" } }
            ],
            "total_count": 2,
            "total_amount": 1200
        }),
        "get_estimates" => json!({
            "estimates": [
                { "Id": "1", "DocNumber": "EST-001", "CustomerRef": { "name": "John Smith" }, "TotalAmt": 500, "Status": "Sent" },
                { "Id": "2", "DocNumber": "EST-002", "CustomerRef": { "name": "Sarah Johnson" }, "TotalAmt": 300, "Status": "Accepted" }
            ],
            "total_count": 2,
            "total_value": 800
        }),
        "get_expenses" => json!({
            "expenses": [
                { "Id": "1", "TotalAmt": 150, "TxnDate": "2024-01-15", "AccountRef": { "name": "Office Supplies" } },
                { "Id": "2", "TotalAmt": 200, "TxnDate": "2024-01-10", "AccountRef": { "name": "Equipment" } }
            ],
            "total_count": 2,
            "total_amount": 350
        }),
        "get_expenses_summary" => {
            let (period, range) = period_of(arguments);
            json!({
                "period": period,
                "total_expenses": 12500,
                "breakdown": { "materials": 8000, "labor": 3500, "overhead": 1000 },
                "date_range": range
            })
        }
        "get_revenue_summary" => {
            let (period, range) = period_of(arguments);
            json!({
                "period": period,
                "total_revenue": 47800,
                "breakdown": { "services": 42000, "materials": 5800 },
                "date_range": range
            })
        }
        "get_profit_loss" => {
            let from = arg_str(arguments, "date_from");
            let to = arg_str(arguments, "date_to");
            json!({
                "profit_loss": {
                    "Header": { "ReportName": "Profit and Loss", "StartPeriod": from, "EndPeriod": to },
                    "Rows": [
                        { "type": "Section", "group": "Income", "Summary": { "ColData": [{ "value": "47800" }] } },
                        { "type": "Section", "group": "Expenses", "Summary": { "ColData": [{ "value": "12500" }] } }
                    ]
                },
                "date_range": { "from": from, "to": to }
            })
        }
        "get_accounts" => json!({
            "accounts": [
                { "Id": "1", "Name": "Checking Account", "AccountType": "Bank", "CurrentBalance": 15000 },
                { "Id": "2", "Name": "Sales Revenue", "AccountType": "Income", "CurrentBalance": 47800 }
            ],
            "total_count": 2
        }),
        "get_account_balance" => json!({
            "account": {
                "Id": arg_str(arguments, "account_id"),
                "Name": "Checking Account",
                "AccountType": "Bank",
                "CurrentBalance": 15000
            },
            "balance": 15000,
            "account_type": "Bank",
            "currency": "USD"
        }),
        "get_transactions" => json!({
            "transactions": [
                { "Id": "1", "TxnType": "JournalEntry", "TxnDate": "2024-01-15", "TotalAmt": 500 },
                { "Id": "2", "TxnType": "Deposit", "TxnDate": "2024-01-10", "TotalAmt": 1000 }
            ],
            "total_count": 2
        }),
        "get_items" => json!({
            "items": [
                { "Id": "1", "Name": "HVAC Service", "Type": "Service", "UnitPrice": 150 },
                { "Id": "2", "Name": "Plumbing Repair", "Type": "Service", "UnitPrice": 200 }
            ],
            "total_count": 2
        }),
        _ => json!({}),
    };
    tag_mock(body, NOTE)
}

fn invoice(id: &str, number: &str, customer: &str, total: u64, balance: u64, due: &str) -> Value {
    json!({
        "Id": id,
        "DocNumber": number,
        "CustomerRef": { "name": customer },
        "TotalAmt": total,
        "Balance": balance,
        "DueDate": due
    })
}

fn customers(arguments: &Value) -> Value {
    let include_balance = arg_bool(arguments, "include_balance").unwrap_or(false);
    let include_invoices = arg_bool(arguments, "include_outstanding_invoices").unwrap_or(false);
    let customer = |id: &str, name: &str, company: &str, balance: u64, invoice_no: &str, due: &str| {
        let mut entry = json!({ "Id": id, "Name": name, "CompanyName": company });
        if include_balance {
            entry["Balance"] = json!(balance);
        }
        if include_invoices {
            entry["OutstandingInvoices"] = json!([{
                "Id": invoice_no,
                "DocNumber": invoice_no,
                "TotalAmt": balance,
                "Balance": balance,
                "DueDate": due
            }]);
        }
        entry
    };
    json!({
        "customers": [
            customer("1", "John Smith", "Smith Residence", 350, "INV-001", "2024-01-20"),
            customer("2", "Sarah Johnson", "Johnson Home", 275, "INV-002", "2024-01-25")
        ],
        "total_count": 2
    })
}

fn customer_details(customer_id: &str) -> Value {
    json!({
        "customer": {
            "Id": customer_id,
            "Name": "John Smith",
            "CompanyName": "Smith Residence",
            "EmailAddr": "john@smith.com",
            "Phone": "555-123-4567",
            "Balance": 350
        },
        "invoices": {
            "total": 3,
            "outstanding": 1,
            "total_outstanding_amount": 350,
            "recent": [
                { "Id": "INV-001", "DocNumber": "INV-001", "TotalAmt": 350, "Balance": 350, "DueDate": "2024-01-20" }
            ]
        },
        "payments": {
            "total": 2,
            "total_amount": 1200,
            "recent": [{ "Id": "PAY-001", "TotalAmt": 800, "TxnDate": "2024-01-15" }]
        }
    })
}

/// Two open invoices, one overdue.
fn outstanding_invoices(arguments: &Value) -> Value {
    let overdue_only = arg_bool(arguments, "overdue_only").unwrap_or(false);
    let with_customer = arg_bool(arguments, "include_customer_details").unwrap_or(false);

    let mut first = invoice("1", "INV-001", "John Smith", 350, 350, "2024-01-20");
    first["overdue"] = json!(true);
    let mut second = invoice("2", "INV-002", "Sarah Johnson", 275, 275, "2024-01-25");
    second["overdue"] = json!(false);
    if with_customer {
        first["CustomerDetails"] = json!({
            "Id": "1",
            "Name": "John Smith",
            "EmailAddr": "john@smith.com",
            "Phone": "555-123-4567"
        });
        second["CustomerDetails"] = json!({
            "Id": "2",
            "Name": "Sarah Johnson",
            "EmailAddr": "sarah@johnsonhome.com",
            "Phone": "555-987-6543"
        });
    }

    let invoices: Vec<Value> = [first, second]
        .into_iter()
        .filter(|inv| !overdue_only || inv["overdue"] == json!(true))
        .collect();
    let total: u64 = invoices.iter().filter_map(|inv| inv["Balance"].as_u64()).sum();
    json!({
        "invoices": invoices,
        "total_outstanding": total,
        "overdue_only": overdue_only
    })
}

fn period_of(arguments: &Value) -> (Value, Value) {
    let name = arg_str(arguments, "period").unwrap_or("current_month");
    let period = name.parse::<Period>().unwrap_or(Period::CurrentMonth);
    let range = period.date_range(Utc::now().date_naive());
    (json!(name), json!(range))
}
