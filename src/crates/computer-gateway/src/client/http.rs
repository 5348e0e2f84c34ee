//! reqwest-backed daemon transport.

use super::{CallError, DaemonRequest, DaemonTransport, RawResponse};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

/// HTTP transport holding one persistent connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    ///
    /// `default_timeout` applies to requests that do not set their own; every
    /// request built by the gateway does.
    pub fn new(
        base_url: impl Into<String>,
        default_timeout: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Client::builder().timeout(default_timeout);

        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(
            config.base_url.as_str(),
            config.request_timeout(),
            config.user_agent.as_deref(),
        )
    }
}

#[async_trait]
impl DaemonTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &DaemonRequest) -> std::result::Result<RawResponse, CallError> {
        let url = self.url(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(request.timeout);

        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(&request.method, &url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(&request.method, &url, e))?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

fn classify(method: &Method, url: &str, error: reqwest::Error) -> CallError {
    if error.is_timeout() {
        CallError::Timeout {
            method: method.clone(),
            url: url.to_string(),
        }
    } else {
        CallError::Transport {
            method: method.clone(),
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
