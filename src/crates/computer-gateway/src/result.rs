//! Uniform tool results and daemon response normalization.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one action, as handed back to the caller.
///
/// Either `output` or `error` carries the payload, never both. An image is
/// only attached to a success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    base64_image: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A success carrying only an image.
    pub fn screenshot(base64_image: impl Into<String>) -> Self {
        Self {
            base64_image: Some(base64_image.into()),
            ..Self::default()
        }
    }

    /// Attach an image. Ignored on failures.
    pub fn with_image(mut self, base64_image: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.base64_image = Some(base64_image.into());
        }
        self
    }

    pub fn from_error(error: &GatewayError) -> Self {
        Self::failure(error.to_string())
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn base64_image(&self) -> Option<&str> {
        self.base64_image.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_none() && self.error.is_none() && self.base64_image.is_none()
    }
}

/// `{status, screenshot?}` from an input action.
///
/// A missing status yields no output; a missing screenshot yields no image.
pub fn from_status_response(response: &Value) -> ToolResult {
    ToolResult {
        output: response.get("status").and_then(value_text),
        error: None,
        base64_image: response
            .get("screenshot")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// `{image}` from `GET /screenshot`.
pub fn from_screenshot_response(response: &Value) -> Result<ToolResult, GatewayError> {
    response
        .get("image")
        .and_then(Value::as_str)
        .map(ToolResult::screenshot)
        .ok_or_else(|| GatewayError::InvalidResponse("screenshot response has no image".into()))
}

/// `{x, y}` from a cursor query, rendered as `X=<x>,Y=<y>`.
pub fn from_cursor_response(response: &Value) -> Result<ToolResult, GatewayError> {
    let x = response.get("x").and_then(value_text);
    let y = response.get("y").and_then(value_text);

    match (x, y) {
        (Some(x), Some(y)) => Ok(ToolResult::success(format!("X={},Y={}", x, y))),
        _ => Err(GatewayError::InvalidResponse(format!(
            "cursor response missing x or y: {}",
            response
        ))),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
