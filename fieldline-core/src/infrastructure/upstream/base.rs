//! HTTP upstream with shared request logic

use super::{Upstream, UpstreamBody, UpstreamRequest};
use crate::application::endpoint::UpstreamError;
use crate::config::defaults;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum UpstreamAuth {
    Bearer(Option<String>),
    Basic {
        username: Option<String>,
        password: Option<String>,
    },
}

/// Base HTTP client for one external system
#[derive(Clone)]
pub struct HttpUpstream {
    pub name: String,
    pub base_url: String,
    pub auth: UpstreamAuth,
    pub http: Client,
    /// Per-request bound, never longer than the client's default call timeout.
    pub timeout: Duration,
}

impl HttpUpstream {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, auth: UpstreamAuth) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth,
            http: Client::new(),
            timeout: defaults::request_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build URL from base URL and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn has_credentials(&self) -> bool {
        match &self.auth {
            UpstreamAuth::Bearer(token) => present(token).is_some(),
            UpstreamAuth::Basic { username, password } => {
                present(username).is_some() && present(password).is_some()
            }
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, UpstreamError> {
        match &self.auth {
            UpstreamAuth::Bearer(token) => {
                let token =
                    present(token).ok_or_else(|| UpstreamError::missing_credentials(&self.name))?;
                Ok(builder.bearer_auth(token))
            }
            UpstreamAuth::Basic { username, password } => {
                let (Some(username), Some(password)) = (present(username), present(password))
                else {
                    return Err(UpstreamError::missing_credentials(&self.name));
                };
                Ok(builder.basic_auth(username, Some(password)))
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl Upstream for HttpUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let url = self.build_url(&request.path);
        debug!(upstream = %self.name, method = %request.method, %url, "Calling upstream");

        let mut builder = self
            .http
            .request(request.method, &url)
            .timeout(self.timeout)
            .header("Accept", "application/json");
        builder = self.authorize(builder)?;
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            Some(UpstreamBody::Json(body)) => builder.json(&body),
            Some(UpstreamBody::Form(form)) => builder.form(&form),
            None => builder,
        };

        let text = builder
            .send()
            .await
            .map_err(|e| UpstreamError::network(&self.name, e))?
            .error_for_status()
            .map_err(|e| UpstreamError::network(&self.name, e))?
            .text()
            .await
            .map_err(|e| UpstreamError::network(&self.name, e))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| UpstreamError::invalid_response(&self.name, e.to_string()))
    }
}
