//! Shared harness for gateway integration tests.
//!
//! [`ScriptedTransport`] answers daemon requests from per-route scripts and
//! records every request; [`harness`] wires it into a gateway that sleeps on a
//! [`ManualClock`], so no test waits in real time.

#![allow(dead_code)]

use async_trait::async_trait;
use computer_gateway::{
    CallError, ComputerGateway, DaemonRequest, DaemonTransport, GatewayConfig, ManualClock,
    RawResponse,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

pub const BASE_URL: &str = "http://scripted.test";

/// One canned answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
    Timeout,
}

impl Reply {
    pub fn ok(status: &str) -> Self {
        Reply::Json(json!({ "status": status }))
    }

    pub fn json(value: Value) -> Self {
        Reply::Json(value)
    }

    pub fn status(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }

    /// A 2xx answer with an arbitrary body.
    pub fn raw(body: &str) -> Self {
        Reply::Status(200, body.to_string())
    }
}

#[derive(Default)]
struct Script {
    once: HashMap<String, VecDeque<Reply>>,
    always: HashMap<String, Reply>,
}

/// Transport answering from route scripts.
///
/// Routes are `"<METHOD> <path>"`, optionally followed by `" <text>"` to
/// match the `text` field of the payload (e.g. `"POST /input/key Tab"`).
/// One-shot replies are consumed before sticky ones, and text-specific routes
/// win over plain ones. Unscripted requests answer `{"status": "ok"}`.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    calls: Mutex<Vec<DaemonRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply that is used once.
    pub fn once(&self, route: &str, reply: Reply) -> &Self {
        self.lock_script()
            .once
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Reply to every request on `route`.
    pub fn always(&self, route: &str, reply: Reply) -> &Self {
        self.lock_script().always.insert(route.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<DaemonRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `"<METHOD> <path>"` of every request, in order.
    pub fn routes(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }

    /// Text of every `/input/key` request, in order.
    pub fn keys(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| c.path == "/input/key")
            .filter_map(|c| payload_text(c).map(str::to_string))
            .collect()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reply_for(&self, request: &DaemonRequest) -> Reply {
        let plain = format!("{} {}", request.method, request.path);
        let mut routes = Vec::with_capacity(2);
        if let Some(text) = payload_text(request) {
            routes.push(format!("{} {}", plain, text));
        }
        routes.push(plain);

        let mut script = self.lock_script();
        for route in &routes {
            if let Some(reply) = script.once.get_mut(route).and_then(VecDeque::pop_front) {
                return reply;
            }
            if let Some(reply) = script.always.get(route) {
                return reply.clone();
            }
        }
        Reply::ok("ok")
    }
}

fn payload_text(request: &DaemonRequest) -> Option<&str> {
    request
        .payload
        .as_ref()
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
}

#[async_trait]
impl DaemonTransport for ScriptedTransport {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn send(&self, request: &DaemonRequest) -> Result<RawResponse, CallError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.reply_for(request) {
            Reply::Json(value) => Ok(RawResponse::new(200, value.to_string())),
            Reply::Status(code, body) => Ok(RawResponse::new(code, body)),
            Reply::Timeout => Err(CallError::Timeout {
                method: request.method.clone(),
                url: self.url(&request.path),
            }),
        }
    }
}

/// Gateway over a scripted transport with a manual clock.
pub fn harness(config: GatewayConfig) -> (ComputerGateway, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let transport = ScriptedTransport::new();
    let clock = Arc::new(ManualClock::new());
    let gateway = ComputerGateway::with_parts(config, transport.clone(), clock.clone(), clock.clone());
    (gateway, transport, clock)
}

pub fn default_harness() -> (ComputerGateway, Arc<ScriptedTransport>, Arc<ManualClock>) {
    harness(GatewayConfig::default())
}
