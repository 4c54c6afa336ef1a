use crate::domain::ToolDescriptor;
use serde_json::json;

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "get_jobs",
            "Get jobs/appointments for a specific date",
            json!({
                "type": "object",
                "properties": {
                    "date": { "type": "string", "description": "Date in YYYY-MM-DD format" },
                    "status": {
                        "type": "string",
                        "enum": ["scheduled", "in_progress", "completed", "cancelled"],
                        "description": "Filter by job status"
                    },
                    "technician_id": { "type": "string", "description": "Filter by specific technician" }
                },
                "required": ["date"]
            }),
        ),
        ToolDescriptor::new(
            "get_customers",
            "Get list of customers",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "maximum": 100,
                        "description": "Number of customers to return (max 100)"
                    },
                    "sort": {
                        "type": "string",
                        "enum": ["created_at", "updated_at", "name"],
                        "description": "Sort field"
                    },
                    "order": { "type": "string", "enum": ["asc", "desc"], "description": "Sort order" }
                }
            }),
        ),
        ToolDescriptor::new(
            "get_customer",
            "Get detailed information about a specific customer",
            json!({
                "type": "object",
                "properties": { "id": { "type": "string", "description": "Customer ID" } },
                "required": ["id"]
            }),
        ),
        ToolDescriptor::new(
            "get_customer_jobs",
            "Get job history for a specific customer",
            json!({
                "type": "object",
                "properties": {
                    "customer_id": { "type": "string", "description": "Customer ID" },
                    "limit": { "type": "integer", "description": "Number of jobs to return" }
                },
                "required": ["customer_id"]
            }),
        ),
        ToolDescriptor::new(
            "optimize_route",
            "Order a technician's jobs for the day by scheduled start time",
            json!({
                "type": "object",
                "properties": {
                    "date": { "type": "string", "description": "Date in YYYY-MM-DD format" },
                    "technician_id": { "type": "string", "description": "Technician ID" }
                },
                "required": ["date"]
            }),
        ),
        ToolDescriptor::new(
            "create_follow_up_task",
            "Create a follow-up task for a customer",
            json!({
                "type": "object",
                "properties": {
                    "customer_id": { "type": "string", "description": "Customer ID" },
                    "description": { "type": "string", "description": "Task description" },
                    "due_date": { "type": "string", "description": "Due date in YYYY-MM-DD format" },
                    "priority": {
                        "type": "string",
                        "enum": ["low", "medium", "high"],
                        "description": "Task priority"
                    }
                },
                "required": ["customer_id", "description"]
            }),
        ),
        ToolDescriptor::new(
            "update_customer_notes",
            "Update customer notes",
            json!({
                "type": "object",
                "properties": {
                    "customer_id": { "type": "string", "description": "Customer ID" },
                    "notes": { "type": "string", "description": "Notes to add or update" },
                    "append": {
                        "type": "boolean",
                        "description": "Whether to append to existing notes or replace"
                    }
                },
                "required": ["customer_id", "notes"]
            }),
        ),
    ]
}
