use serde_json::{Value, json};
use thiserror::Error;

/// Failures that stop a tool call before it reaches the upstream system.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },
    #[error("invalid arguments for {tool}: {}", .violations.join("; "))]
    InvalidArguments {
        tool: String,
        violations: Vec<String>,
    },
}

impl EndpointError {
    pub fn tool(&self) -> &str {
        match self {
            EndpointError::UnknownTool { tool } | EndpointError::InvalidArguments { tool, .. } => {
                tool
            }
        }
    }

    /// Text placed in the `isError` result. Always a JSON document.
    pub fn details(&self) -> Value {
        match self {
            EndpointError::UnknownTool { tool } => json!({
                "error": "unknown_tool",
                "tool": tool,
                "message": format!("Error executing {tool}: Unknown tool: {tool}"),
            }),
            EndpointError::InvalidArguments { tool, violations } => json!({
                "error": "invalid_arguments",
                "tool": tool,
                "message": format!("Error executing {tool}: invalid arguments"),
                "violations": violations,
            }),
        }
    }
}

/// The external system behind an endpoint could not serve a request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{upstream} credentials are not configured")]
    MissingCredentials { upstream: String },
    #[error("{upstream} request failed: {source}")]
    Network {
        upstream: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{upstream} returned an unusable response: {reason}")]
    InvalidResponse { upstream: String, reason: String },
    #[error("{upstream} has no {what}")]
    NotFound { upstream: String, what: String },
}

impl UpstreamError {
    pub fn missing_credentials(upstream: impl Into<String>) -> Self {
        Self::MissingCredentials {
            upstream: upstream.into(),
        }
    }

    pub fn network(upstream: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            upstream: upstream.into(),
            source,
        }
    }

    pub fn invalid_response(upstream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            upstream: upstream.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(upstream: impl Into<String>, what: impl Into<String>) -> Self {
        Self::NotFound {
            upstream: upstream.into(),
            what: what.into(),
        }
    }
}
