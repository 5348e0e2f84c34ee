//! Typed client for the flat v2 daemon surface.
//!
//! Unlike [`crate::ComputerGateway`], which accepts loosely typed tool calls,
//! [`DesktopClient`] exposes one method per primitive and returns typed
//! values. Action endpoints answer `{status}`; a call succeeded when the
//! status is `success` in any case.

use crate::action::Coordinate;
use crate::async_utils::retry::RetryPolicy;
use crate::async_utils::time::TokioSleeper;
use crate::client::{endpoints, HttpTransport, RemoteCallClient};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Async client for one desktop session.
#[derive(Debug)]
pub struct DesktopClient {
    client: RemoteCallClient,
}

impl DesktopClient {
    pub fn new(client: RemoteCallClient) -> Self {
        Self { client }
    }

    /// Client for an explicit base URL. Calls are not retried.
    pub fn from_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let transport = HttpTransport::new(base_url, timeout, None)?;
        Ok(Self::new(RemoteCallClient::new(
            Arc::new(transport),
            RetryPolicy::new(0),
            Arc::new(TokioSleeper),
            timeout,
        )))
    }

    /// Client using the configuration's address, timeout and retry policy.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Ok(Self::new(RemoteCallClient::from_config(config)?))
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Base64-encoded PNG of the current screen.
    pub async fn screenshot_base64(&self) -> Result<String> {
        let data = self.client.get(endpoints::SCREENSHOT).await?;
        data.get("image")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::InvalidResponse("screenshot response has no image".into()))
    }

    /// Raw PNG bytes of the current screen.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let encoded = self.screenshot_base64().await?;
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| GatewayError::InvalidResponse(format!("screenshot is not base64: {}", e)))
    }

    pub async fn mouse_position(&self) -> Result<Coordinate> {
        let data = self.client.get(endpoints::MOUSE_POSITION).await?;
        match (field_u32(&data, "x"), field_u32(&data, "y")) {
            (Some(x), Some(y)) => Ok(Coordinate::new(x, y)),
            _ => Err(GatewayError::InvalidResponse(format!(
                "mouse position missing x or y: {}",
                data
            ))),
        }
    }

    /// Move the pointer. Returns the coordinates the daemon reports, falling
    /// back to the requested ones.
    pub async fn mouse_move(&self, x: u32, y: u32) -> Result<Coordinate> {
        let data = self.client.post("/mouse_move", &json!({ "x": x, "y": y })).await?;
        Ok(Coordinate::new(
            field_u32(&data, "x").unwrap_or(x),
            field_u32(&data, "y").unwrap_or(y),
        ))
    }

    pub async fn left_click(&self, x: u32, y: u32) -> Result<bool> {
        self.click("/left_click", x, y).await
    }

    pub async fn right_click(&self, x: u32, y: u32) -> Result<bool> {
        self.click("/right_click", x, y).await
    }

    pub async fn middle_click(&self, x: u32, y: u32) -> Result<bool> {
        self.click("/middle_click", x, y).await
    }

    pub async fn double_click(&self, x: u32, y: u32) -> Result<bool> {
        self.click("/double_click", x, y).await
    }

    /// Press a key combination in xdotool syntax, e.g. `ctrl+c`.
    pub async fn key(&self, text: &str) -> Result<bool> {
        if text.is_empty() {
            return Err(ValidationError::new("text is required for key").into());
        }
        let data = self.client.post("/key", &json!({ "text": text })).await?;
        Ok(is_success(&data))
    }

    pub async fn type_text(&self, text: &str) -> Result<bool> {
        if text.is_empty() {
            return Err(ValidationError::new("text is required for type_text").into());
        }
        let data = self.client.post("/type", &json!({ "text": text })).await?;
        Ok(is_success(&data))
    }

    async fn click(&self, path: &str, x: u32, y: u32) -> Result<bool> {
        let data = self.client.post(path, &json!({ "x": x, "y": y })).await?;
        Ok(is_success(&data))
    }
}

fn is_success(data: &Value) -> bool {
    data.get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| status.eq_ignore_ascii_case("success"))
}

fn field_u32(data: &Value, name: &str) -> Option<u32> {
    data.get(name)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}
