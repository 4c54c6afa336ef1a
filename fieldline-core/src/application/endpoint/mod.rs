//! # Tool endpoints
//!
//! Server side of the protocol. Each endpoint fronts one external system and
//! exposes a static tool catalog. [`call_tool`] is the shared dispatch:
//! lookup, argument validation, execution, and substitution of a tagged
//! payload when the upstream call fails. Nothing escapes it as an error.

mod error;
pub mod schema;

pub use error::{EndpointError, UpstreamError};

use crate::domain::{PeerId, ToolDescriptor, ToolResult};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

#[async_trait]
pub trait ToolEndpoint: Send + Sync {
    fn peer(&self) -> PeerId;

    /// Static catalog advertised through `tools/list`.
    fn tools(&self) -> &[ToolDescriptor];

    /// Runs a validated call against the upstream system.
    async fn execute(&self, tool: &str, arguments: &Value) -> Result<Value, UpstreamError>;

    /// Substitute payload for a failed upstream call, tagged with a `note`.
    fn fallback(&self, tool: &str, arguments: &Value, error: &UpstreamError) -> Value;

    fn server_info(&self) -> Value {
        json!({
            "name": self.peer().server_name(),
            "version": env!("CARGO_PKG_VERSION"),
        })
    }
}

pub fn list_tools(endpoint: &dyn ToolEndpoint) -> Vec<ToolDescriptor> {
    endpoint.tools().to_vec()
}

pub async fn call_tool(endpoint: &dyn ToolEndpoint, name: &str, arguments: Value) -> ToolResult {
    match dispatch(endpoint, name, arguments).await {
        Ok(payload) => ToolResult::json(&payload),
        Err(err) => {
            debug!(peer = %endpoint.peer(), tool = name, %err, "Rejected tool call");
            ToolResult::error_json(&err.details())
        }
    }
}

async fn dispatch(
    endpoint: &dyn ToolEndpoint,
    name: &str,
    arguments: Value,
) -> Result<Value, EndpointError> {
    let descriptor = endpoint
        .tools()
        .iter()
        .find(|tool| tool.name == name)
        .ok_or_else(|| EndpointError::UnknownTool {
            tool: name.to_string(),
        })?;

    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    schema::validate(&descriptor.input_schema, &arguments).map_err(|violations| {
        EndpointError::InvalidArguments {
            tool: name.to_string(),
            violations,
        }
    })?;

    match endpoint.execute(name, &arguments).await {
        Ok(payload) => Ok(payload),
        Err(err) => {
            warn!(
                peer = %endpoint.peer(),
                tool = name,
                %err,
                "Upstream call failed, serving substitute payload"
            );
            Ok(endpoint.fallback(name, &arguments, &err))
        }
    }
}

/// Marks a substitute payload: adds `note` and `"source": "mock"` to objects.
pub fn tag_mock(payload: Value, note: &str) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.entry("note")
                .or_insert_with(|| Value::String(note.to_string()));
            map.insert("source".to_string(), Value::String("mock".to_string()));
            Value::Object(map)
        }
        other => json!({ "data": other, "note": note, "source": "mock" }),
    }
}

/// Reads an optional string argument.
pub(crate) fn arg_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

pub(crate) fn arg_u64(arguments: &Value, key: &str) -> Option<u64> {
    arguments.get(key).and_then(Value::as_u64)
}

pub(crate) fn arg_bool(arguments: &Value, key: &str) -> Option<bool> {
    arguments.get(key).and_then(Value::as_bool)
}
