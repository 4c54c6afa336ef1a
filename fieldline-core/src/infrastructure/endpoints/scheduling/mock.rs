use crate::application::endpoint::{arg_str, tag_mock};
use serde_json::{Value, json};
use uuid::Uuid;

pub const NOTE: &str = "Mock data - HouseCall Pro API unavailable";
const RESPONSE_NOTE: &str = "Mock response - HouseCall Pro API unavailable";

pub(crate) fn payload(tool: &str, arguments: &Value) -> Value {
    match tool {
        "get_jobs" => tag_mock(json!({ "jobs": jobs(arguments) }), NOTE),
        "get_customers" => tag_mock(json!({ "customers": customers() }), NOTE),
        "get_customer" => tag_mock(customer(arg_str(arguments, "id").unwrap_or("101")), NOTE),
        "get_customer_jobs" => {
            let history = job_history();
            let total = history.as_array().map_or(0, Vec::len);
            tag_mock(json!({ "jobs": history, "total_jobs": total }), NOTE)
        }
        "optimize_route" => {
            let jobs = jobs(arguments).as_array().cloned().unwrap_or_default();
            tag_mock(super::order_route(jobs), NOTE)
        }
        "create_follow_up_task" => tag_mock(
            json!({
                "success": true,
                "task_id": format!("task_{}", Uuid::new_v4().simple()),
                "message": "Follow-up task created successfully",
            }),
            RESPONSE_NOTE,
        ),
        "update_customer_notes" => tag_mock(
            json!({ "success": true, "message": "Customer notes updated successfully" }),
            RESPONSE_NOTE,
        ),
        _ => tag_mock(json!({}), NOTE),
    }
}

/// Three jobs for one technician on the requested date.
pub(crate) fn jobs(arguments: &Value) -> Value {
    let date = arg_str(arguments, "date").unwrap_or("2024-01-15");
    let job = |id: &str, customer: (&str, &str, &str), start: &str, end: &str, status: &str, amount: u64, description: &str| {
        json!({
            "id": id,
            "customer": { "id": customer.0, "name": customer.1, "address": customer.2 },
            "scheduled_start": format!("{date}T{start}:00Z"),
            "scheduled_end": format!("{date}T{end}:00Z"),
            "work_status": status,
            "total_amount": amount,
            "description": description,
            "technician": { "id": "tech1", "name": "Mike Rodriguez" }
        })
    };
    json!([
        job(
            "1",
            ("101", "Sarah Johnson", "123 Oak Street, Springfield, IL 62701"),
            "09:00",
            "10:30",
            "completed",
            350,
            "HVAC Maintenance - Annual inspection and cleaning",
        ),
        job(
            "2",
            ("102", "Robert Smith", "456 Pine Avenue, Springfield, IL 62704"),
            "11:30",
            "13:00",
            "in_progress",
            275,
            "Plumbing Repair - Kitchen sink leak",
        ),
        job(
            "3",
            ("103", "Emily Davis", "789 Elm Drive, Springfield, IL 62702"),
            "14:00",
            "15:30",
            "scheduled",
            180,
            "Electrical Installation - New outlet installation",
        ),
    ])
}

fn customers() -> Value {
    json!([
        {
            "id": "101",
            "name": "Sarah Johnson",
            "email": "sarah.johnson@email.com",
            "phone": "(555) 123-4567",
            "address": { "street": "123 Oak Street", "city": "Springfield", "state": "IL", "zip": "62701" },
            "created_at": "2021-03-15T10:30:00Z",
            "last_job_date": "2024-01-15T09:00:00Z",
            "total_jobs": 12,
            "customer_rating": 5.0,
            "notes": "Preferred customer - always pays on time. HVAC system warranty expires March 2024."
        },
        {
            "id": "102",
            "name": "Robert Smith",
            "email": "robert.smith@email.com",
            "phone": "(555) 987-6543",
            "address": { "street": "456 Pine Avenue", "city": "Springfield", "state": "IL", "zip": "62704" },
            "created_at": "2023-08-22T14:15:00Z",
            "last_job_date": "2024-01-15T11:30:00Z",
            "total_jobs": 3,
            "customer_rating": 4.2,
            "notes": "Tends to call multiple times for updates. Good payment history."
        }
    ])
}

fn customer(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Sarah Johnson",
        "email": "sarah.johnson@email.com",
        "phone": "(555) 123-4567",
        "address": { "street": "123 Oak Street", "city": "Springfield", "state": "IL", "zip": "62701" },
        "created_at": "2021-03-15T10:30:00Z",
        "total_jobs": 12,
        "total_spent": 4200,
        "customer_rating": 5.0,
        "payment_terms": "Net 30",
        "preferred_technician": "Mike Rodriguez",
        "notes": "Preferred customer - always pays on time. HVAC system warranty expires March 2024.",
        "tags": ["VIP", "HVAC Customer"],
        "emergency_contact": { "name": "John Johnson", "phone": "(555) 123-4568", "relationship": "Spouse" }
    })
}

fn job_history() -> Value {
    json!([
        {
            "id": "1",
            "date": "2024-01-15T09:00:00Z",
            "service_type": "HVAC Maintenance",
            "amount": 350,
            "status": "completed",
            "technician": "Mike Rodriguez",
            "notes": "Annual inspection completed. System running efficiently."
        },
        {
            "id": "2",
            "date": "2023-10-20T13:30:00Z",
            "service_type": "HVAC Repair",
            "amount": 275,
            "status": "completed",
            "technician": "Mike Rodriguez",
            "notes": "Replaced faulty thermostat. Customer very satisfied."
        },
        {
            "id": "3",
            "date": "2023-06-15T11:00:00Z",
            "service_type": "HVAC Installation",
            "amount": 2850,
            "status": "completed",
            "technician": "Mike Rodriguez",
            "notes": "New HVAC system installed. 3-year warranty provided."
        }
    ])
}
