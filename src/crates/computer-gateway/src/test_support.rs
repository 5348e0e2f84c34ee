//! Scripted transport for unit tests.

use crate::client::{CallError, DaemonRequest, DaemonTransport, RawResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) const STUB_BASE_URL: &str = "http://daemon.test";

/// One canned answer.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Response(RawResponse),
    Timeout,
}

impl Reply {
    pub(crate) fn json(value: Value) -> Self {
        Self::Response(RawResponse::new(200, value.to_string()))
    }

    pub(crate) fn raw(status: u16, body: &str) -> Self {
        Self::Response(RawResponse::new(status, body))
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::raw(status, body)
    }

    pub(crate) fn timeout() -> Self {
        Self::Timeout
    }
}

/// Answers requests from a FIFO of replies and records every request.
///
/// Once the script runs out every request fails with a transport error.
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<DaemonRequest>>,
}

impl StubTransport {
    pub(crate) fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<DaemonRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DaemonTransport for StubTransport {
    fn base_url(&self) -> &str {
        STUB_BASE_URL
    }

    async fn send(&self, request: &DaemonRequest) -> Result<RawResponse, CallError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Timeout) => Err(CallError::Timeout {
                method: request.method.clone(),
                url: self.url(&request.path),
            }),
            None => Err(CallError::Transport {
                method: request.method.clone(),
                url: self.url(&request.path),
                message: "no scripted reply".to_string(),
            }),
        }
    }
}
