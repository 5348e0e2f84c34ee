//! Tool definition advertised to LLM tool-use APIs.

use crate::config::DisplayConfig;
use serde::{Deserialize, Serialize};

pub const TOOL_NAME: &str = "computer";
pub const TOOL_TYPE: &str = "computer_20250124";

/// Parameters describing the computer-use tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub display_width_px: u32,
    pub display_height_px: u32,
    /// Serialized as `null` when unset
    pub display_number: Option<u32>,
}

impl ToolDefinition {
    pub fn for_display(display: &DisplayConfig) -> Self {
        Self {
            name: TOOL_NAME.to_string(),
            tool_type: TOOL_TYPE.to_string(),
            display_width_px: display.width,
            display_height_px: display.height,
            display_number: display.display_number,
        }
    }
}

impl Default for ToolDefinition {
    fn default() -> Self {
        Self::for_display(&DisplayConfig::default())
    }
}
