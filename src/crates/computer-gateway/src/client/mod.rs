//! Remote call client for the automation daemon.
//!
//! This module provides:
//! - [`DaemonTransport`], the seam between the gateway and the wire
//! - [`HttpTransport`], the reqwest implementation of that seam
//! - [`RemoteCallClient`], which adds per-call timeouts, bounded
//!   exponential-backoff retry and failure classification on top
//!
//! # Example
//!
//! ```rust,ignore
//! use computer_gateway::client::RemoteCallClient;
//! use computer_gateway::GatewayConfig;
//!
//! let client = RemoteCallClient::from_config(&GatewayConfig::new("http://localhost:8002"))?;
//! let screenshot = client.get("/screenshot").await?;
//! ```

mod http;

pub use http::HttpTransport;

use crate::async_utils::retry::{with_retry_if, RetryPolicy};
use crate::async_utils::time::{Sleeper, TokioSleeper};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::logging::summarize_payload;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Daemon endpoint paths.
pub mod endpoints {
    /// Screenshot capture; answers `{image}`.
    pub const SCREENSHOT: &str = "/screenshot";
    /// Pointer position; answers `{x, y}`.
    pub const MOUSE_POSITION: &str = "/mouse_position";
    /// Prefix for input actions, e.g. `/input/left_click`.
    pub const INPUT_PREFIX: &str = "/input";
}

/// A failed daemon call.
///
/// The shapes only differ in the diagnostics they carry; the retry policy
/// treats `Status`, `Timeout` and `Transport` the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The daemon answered with a non-2xx status.
    #[error("{status} {reason} {method} {url} body={body}")]
    Status {
        status: u16,
        reason: String,
        method: Method,
        url: String,
        body: String,
    },

    /// No answer within the call's timeout.
    #[error("timeout {method} {url}")]
    Timeout { method: Method, url: String },

    /// Connection-level failure.
    #[error("{method} {url}: {message}")]
    Transport {
        method: Method,
        url: String,
        message: String,
    },

    /// A 2xx answer whose body is not JSON. Never retried.
    #[error("undecodable body from {method} {url}: {message}")]
    InvalidBody {
        method: Method,
        url: String,
        message: String,
    },
}

impl CallError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidBody { .. })
    }

    /// HTTP status for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One outbound request. Every request carries its own timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonRequest {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    pub timeout: Duration,
}

/// Status line and body of a daemon answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request to the daemon.
///
/// Implementations report only network-level failures (`Timeout`,
/// `Transport`) as errors; any status line received is returned as a
/// [`RawResponse`] so the caller can classify it.
#[async_trait]
pub trait DaemonTransport: Send + Sync {
    /// Base URL of the daemon, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Absolute URL for an endpoint path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn send(&self, request: &DaemonRequest) -> std::result::Result<RawResponse, CallError>;
}

/// Issues daemon calls with timeout and bounded exponential-backoff retry.
///
/// Owns one transport (and through it one connection pool) for its lifetime.
/// Calls are expected to be issued sequentially by a single logical caller.
pub struct RemoteCallClient {
    transport: Arc<dyn DaemonTransport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    default_timeout: Duration,
}

impl RemoteCallClient {
    pub fn new(
        transport: Arc<dyn DaemonTransport>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            policy,
            sleeper,
            default_timeout,
        }
    }

    /// Build a client over HTTP with a tokio sleeper.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(
            Arc::new(transport),
            config.retry.clone(),
            Arc::new(TokioSleeper),
            config.request_timeout(),
        ))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Issue one logical call: up to `retries + 1` attempts.
    ///
    /// A non-2xx answer or a network failure counts as a failed attempt.
    /// A 2xx answer with an undecodable body ends the call at once.
    /// Between attempts the client sleeps `policy.delay_for(attempt)`.
    /// After the last attempt the last failure is returned.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        timeout: Duration,
        retries: usize,
    ) -> std::result::Result<Value, CallError> {
        let request = DaemonRequest {
            method,
            path: path.to_string(),
            payload: payload.cloned(),
            timeout,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            payload = %request.payload.as_ref().map(summarize_payload).unwrap_or_default(),
            "Calling daemon"
        );

        let value = with_retry_if(
            &self.policy,
            retries,
            self.sleeper.as_ref(),
            || self.attempt(&request),
            CallError::is_retryable,
        )
        .await?;

        tracing::debug!(path = %request.path, response = %summarize_payload(&value), "Daemon answered");
        Ok(value)
    }

    /// GET with the default timeout and retry count.
    pub async fn get(&self, path: &str) -> std::result::Result<Value, CallError> {
        self.call(
            Method::GET,
            path,
            None,
            self.default_timeout,
            self.policy.max_retries,
        )
        .await
    }

    /// POST a JSON payload with the default timeout and retry count.
    pub async fn post(&self, path: &str, payload: &Value) -> std::result::Result<Value, CallError> {
        self.post_with_timeout(path, payload, self.default_timeout).await
    }

    /// POST a JSON payload with an explicit timeout.
    pub async fn post_with_timeout(
        &self,
        path: &str,
        payload: &Value,
        timeout: Duration,
    ) -> std::result::Result<Value, CallError> {
        self.call(
            Method::POST,
            path,
            Some(payload),
            timeout,
            self.policy.max_retries,
        )
        .await
    }

    async fn attempt(&self, request: &DaemonRequest) -> std::result::Result<Value, CallError> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            return self.decode(request, response);
        }

        Err(CallError::Status {
            status: response.status,
            reason: response.reason,
            method: request.method.clone(),
            url: self.transport.url(&request.path),
            body: response.body,
        })
    }

    fn decode(
        &self,
        request: &DaemonRequest,
        response: RawResponse,
    ) -> std::result::Result<Value, CallError> {
        if response.body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&response.body).map_err(|e| CallError::InvalidBody {
            method: request.method.clone(),
            url: self.transport.url(&request.path),
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for RemoteCallClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCallClient")
            .field("base_url", &self.base_url())
            .field("policy", &self.policy)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
