//! Action kinds, raw requests and validated actions.
//!
//! An [`ActionRequest`] is what a caller submits: an action name plus loosely
//! typed `text`, `coordinate` and option values, exactly as they arrive from
//! an LLM tool call. [`crate::validation::validate`] turns it into an
//! [`Action`], which carries only the data its kind needs.

use crate::error::ValidationError;
use crate::scroll::ScrollOptions;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The closed set of actions the gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Key,
    Type,
    MouseMove,
    LeftClick,
    LeftClickDrag,
    RightClick,
    MiddleClick,
    DoubleClick,
    Scroll,
    Screenshot,
    CursorPosition,
    Wait,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Key,
        ActionKind::Type,
        ActionKind::MouseMove,
        ActionKind::LeftClick,
        ActionKind::LeftClickDrag,
        ActionKind::RightClick,
        ActionKind::MiddleClick,
        ActionKind::DoubleClick,
        ActionKind::Scroll,
        ActionKind::Screenshot,
        ActionKind::CursorPosition,
        ActionKind::Wait,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Key => "key",
            ActionKind::Type => "type",
            ActionKind::MouseMove => "mouse_move",
            ActionKind::LeftClick => "left_click",
            ActionKind::LeftClickDrag => "left_click_drag",
            ActionKind::RightClick => "right_click",
            ActionKind::MiddleClick => "middle_click",
            ActionKind::DoubleClick => "double_click",
            ActionKind::Scroll => "scroll",
            ActionKind::Screenshot => "screenshot",
            ActionKind::CursorPosition => "cursor_position",
            ActionKind::Wait => "wait",
        }
    }

    /// Daemon path that performs this action directly, e.g. `/input/key`.
    pub fn input_path(&self) -> String {
        format!("{}/{}", crate::client::endpoints::INPUT_PREFIX, self.as_str())
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::new(format!("unknown action: {}", s)))
    }
}

/// A screen position in pixels. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn to_value(self) -> Value {
        json!([self.x, self.y])
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(u32, u32)>::deserialize(deserializer)?;
        Ok(Self { x, y })
    }
}

/// A raw, unvalidated action request.
///
/// Action-specific options (`scroll_direction`, `duration`, ...) live in the
/// same JSON object as `action`, `text` and `coordinate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Value>,

    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            text: None,
            coordinate: None,
            options: Map::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Value::String(text.into()));
        self
    }

    pub fn with_coordinate(mut self, x: u32, y: u32) -> Self {
        self.coordinate = Some(json!([x, y]));
        self
    }

    /// Set the coordinate to an arbitrary JSON value; validation decides
    /// whether it is acceptable.
    pub fn with_raw_coordinate(mut self, coordinate: Value) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up an action-specific option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Parse a request from a JSON object.
    ///
    /// Malformed input is reported as a [`ValidationError`] so callers see a
    /// single error type for everything rejected before dispatch.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(object) = &value else {
            return Err(ValidationError::new("action request must be a JSON object"));
        };

        match object.get("action") {
            None | Some(Value::Null) => return Err(ValidationError::new("action is required")),
            Some(Value::String(name)) => {
                name.parse::<ActionKind>()?;
            }
            Some(_) => return Err(ValidationError::new("action must be a string")),
        }

        serde_json::from_value(value).map_err(|e| ValidationError::new(e.to_string()))
    }
}

/// Pointer actions that click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickButton {
    Left,
    Right,
    Middle,
    Double,
}

impl ClickButton {
    pub fn kind(&self) -> ActionKind {
        match self {
            ClickButton::Left => ActionKind::LeftClick,
            ClickButton::Right => ActionKind::RightClick,
            ClickButton::Middle => ActionKind::MiddleClick,
            ClickButton::Double => ActionKind::DoubleClick,
        }
    }

    /// Whether a click at a coordinate is preceded by a pointer move.
    ///
    /// Middle clicks go straight to the daemon.
    pub fn moves_first(&self) -> bool {
        !matches!(self, ClickButton::Middle)
    }
}

/// A validated wait duration, remembering how the caller wrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitDuration {
    seconds: f64,
    literal: String,
}

impl WaitDuration {
    pub(crate) fn new(seconds: f64, literal: impl Into<String>) -> Self {
        Self {
            seconds,
            literal: literal.into(),
        }
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn as_duration(&self) -> Duration {
        crate::async_utils::retry::seconds_to_duration(self.seconds)
    }
}

impl Default for WaitDuration {
    fn default() -> Self {
        Self::new(1.0, "1")
    }
}

impl fmt::Display for WaitDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// A validated action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Key {
        text: String,
    },
    Type {
        text: String,
    },
    MouseMove {
        to: Coordinate,
    },
    LeftClickDrag {
        to: Coordinate,
    },
    Click {
        button: ClickButton,
        at: Option<Coordinate>,
        modifiers: Option<String>,
    },
    Scroll {
        options: ScrollOptions,
        at: Option<Coordinate>,
    },
    Screenshot,
    CursorPosition,
    Wait {
        duration: WaitDuration,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Key { .. } => ActionKind::Key,
            Action::Type { .. } => ActionKind::Type,
            Action::MouseMove { .. } => ActionKind::MouseMove,
            Action::LeftClickDrag { .. } => ActionKind::LeftClickDrag,
            Action::Click { button, .. } => button.kind(),
            Action::Scroll { .. } => ActionKind::Scroll,
            Action::Screenshot => ActionKind::Screenshot,
            Action::CursorPosition => ActionKind::CursorPosition,
            Action::Wait { .. } => ActionKind::Wait,
        }
    }
}
