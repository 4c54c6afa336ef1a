//! Upstream access for tool endpoints.
//!
//! Endpoints talk to their external system through the [`Upstream`] trait so
//! the HTTP client can be swapped for a scripted one in tests.

mod base;

pub use base::{HttpUpstream, UpstreamAuth};

use crate::application::endpoint::UpstreamError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<UpstreamBody>,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(UpstreamBody::Json(body))
    }

    pub fn patch_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(UpstreamBody::Json(body))
    }

    pub fn post_form(path: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self::new(Method::POST, path).with_body(UpstreamBody::Form(form))
    }

    pub fn with_body(mut self, body: UpstreamBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends the pair only when a value is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[async_trait]
pub trait Upstream: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers by request path; records every request it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedUpstream {
        routes: HashMap<String, Value>,
        offline: bool,
        pub(crate) calls: Mutex<Vec<UpstreamRequest>>,
    }

    impl ScriptedUpstream {
        pub(crate) fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        pub(crate) fn route(mut self, path: &str, response: Value) -> Self {
            self.routes.insert(path.to_string(), response);
            self
        }

        pub(crate) fn recorded(&self) -> Vec<UpstreamRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Upstream for ScriptedUpstream {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
            self.calls.lock().unwrap().push(request.clone());
            if self.offline {
                return Err(UpstreamError::missing_credentials("scripted"));
            }
            self.routes
                .get(&request.path)
                .cloned()
                .ok_or_else(|| UpstreamError::not_found("scripted", request.path.clone()))
        }
    }
}
