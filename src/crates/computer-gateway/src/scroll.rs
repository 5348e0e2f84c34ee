//! Key-event scroll emulation.
//!
//! The daemon has no wheel endpoint, so a scroll is played as a sequence of
//! key presses:
//!
//! 1. optional pointer pre-move (best-effort)
//! 2. focus click on the target coordinate or the display gutter (best-effort)
//! 3. Escape and Tab pre-focus keys (best-effort)
//! 4. optional single End/Home boundary jump
//! 5. `amount` steps, each trying the keys of [`key_strategy`] in order
//!
//! Steps are paced by `step_delay`, with a longer `batch_pause` after every
//! `batch_size` steps.

use crate::action::Coordinate;
use crate::client::{CallError, RemoteCallClient};
use crate::config::{DisplayConfig, TimingConfig};
use crate::error::{GatewayError, ValidationError};
use crate::pointer::PointerDispatcher;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Upper bound for Tab pre-focus presses.
pub const MAX_FOCUS_TABS: u32 = 10;

const KEY_PATH: &str = "/input/key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    Down,
    Up,
}

impl ScrollDirection {
    /// Key that jumps straight to the boundary in this direction.
    pub fn boundary_key(&self) -> &'static str {
        match self {
            ScrollDirection::Down => "End",
            ScrollDirection::Up => "Home",
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(ScrollDirection::Down),
            "up" => Ok(ScrollDirection::Up),
            _ => Err(ValidationError::new("scroll_direction must be 'down' or 'up'")),
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Down => f.write_str("down"),
            ScrollDirection::Up => f.write_str("up"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Line,
    #[default]
    Page,
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Granularity::Line),
            "page" => Ok(Granularity::Page),
            _ => Err(ValidationError::new("granularity must be 'line' or 'page'")),
        }
    }
}

/// Where the focus click lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    #[default]
    Gutter,
    Coordinate,
}

impl FromStr for FocusTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gutter" => Ok(FocusTarget::Gutter),
            "coordinate" => Ok(FocusTarget::Coordinate),
            _ => Err(ValidationError::new(
                "focus_target must be 'gutter' or 'coordinate'",
            )),
        }
    }
}

/// Key-only pre-focus routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStrategy {
    None,
    Escape,
    Tab,
    #[default]
    EscapeTab,
}

impl FocusStrategy {
    pub fn sends_escape(&self) -> bool {
        matches!(self, FocusStrategy::Escape | FocusStrategy::EscapeTab)
    }

    pub fn sends_tab(&self) -> bool {
        matches!(self, FocusStrategy::Tab | FocusStrategy::EscapeTab)
    }
}

impl FromStr for FocusStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FocusStrategy::None),
            "escape" => Ok(FocusStrategy::Escape),
            "tab" => Ok(FocusStrategy::Tab),
            "escape_tab" => Ok(FocusStrategy::EscapeTab),
            _ => Err(ValidationError::new(
                "focus_strategy must be one of 'none', 'escape', 'tab', 'escape_tab'",
            )),
        }
    }
}

/// Validated scroll parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOptions {
    pub direction: ScrollDirection,
    pub amount: u32,
    pub granularity: Granularity,
    pub click_to_focus: bool,
    pub focus_target: FocusTarget,
    pub focus_strategy: FocusStrategy,
    /// Already clamped to `0..=MAX_FOCUS_TABS`
    pub focus_tab_count: u32,
    pub jump_to_boundary: bool,
    pub move_pointer: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::Down,
            amount: 10,
            granularity: Granularity::Page,
            click_to_focus: true,
            focus_target: FocusTarget::Gutter,
            focus_strategy: FocusStrategy::EscapeTab,
            focus_tab_count: 4,
            jump_to_boundary: false,
            move_pointer: false,
        }
    }
}

/// Keys to try, in order, for one scroll step.
///
/// End and Home never appear here; they are only sent by an explicit
/// boundary jump.
pub fn key_strategy(direction: ScrollDirection, granularity: Granularity) -> &'static [&'static str] {
    const DOWN_PAGE: &[&str] = &["PageDown", "Space", "ArrowDown"];
    const DOWN_LINE: &[&str] = &["ArrowDown", "PageDown", "Space"];
    const UP_PAGE: &[&str] = &["PageUp", "ArrowUp"];
    const UP_LINE: &[&str] = &["ArrowUp", "PageUp"];

    match (direction, granularity) {
        (ScrollDirection::Down, Granularity::Page) => DOWN_PAGE,
        (ScrollDirection::Down, Granularity::Line) => DOWN_LINE,
        (ScrollDirection::Up, Granularity::Page) => UP_PAGE,
        (ScrollDirection::Up, Granularity::Line) => UP_LINE,
    }
}

/// Plays one scroll action against the daemon.
pub struct ScrollChoreographer<'a> {
    client: &'a RemoteCallClient,
    timing: &'a TimingConfig,
    display: &'a DisplayConfig,
}

impl<'a> ScrollChoreographer<'a> {
    pub fn new(
        client: &'a RemoteCallClient,
        timing: &'a TimingConfig,
        display: &'a DisplayConfig,
    ) -> Self {
        Self {
            client,
            timing,
            display,
        }
    }

    /// Run the full choreography and return the last daemon response.
    pub async fn run(
        &self,
        options: &ScrollOptions,
        at: Option<Coordinate>,
    ) -> Result<Value, GatewayError> {
        let pointer = PointerDispatcher::new(self.client, self.timing.settle_delay());

        if options.move_pointer {
            if let Some(target) = at {
                match pointer.move_to(target).await {
                    Ok(_) => pointer.settle().await,
                    Err(e) => tracing::debug!(error = %e, "Scroll pre-move failed, continuing"),
                }
            }
        }

        self.acquire_focus(&pointer, options, at).await;
        self.prefocus_keys(&pointer, options).await;

        if options.jump_to_boundary {
            let key = options.direction.boundary_key();
            match self.press(key, self.timing.scroll_key_timeout()).await {
                Ok(response) => {
                    tracing::debug!(key, "Boundary jump accepted");
                    return Ok(response);
                }
                Err(e) => {
                    tracing::debug!(key, error = %e, "Boundary jump failed, stepping instead")
                }
            }
        }

        let keys = key_strategy(options.direction, options.granularity);
        let batch_size = self.timing.batch_size.max(1);
        let mut last_response = None;

        for step in 1..=options.amount as usize {
            last_response = Some(self.step(keys).await?);

            let sleeper = self.client.sleeper();
            sleeper.sleep(self.timing.step_delay()).await;
            if step % batch_size == 0 {
                sleeper.sleep(self.timing.batch_pause()).await;
            }
        }

        last_response.ok_or(GatewayError::EmptyResponse)
    }

    async fn acquire_focus(
        &self,
        pointer: &PointerDispatcher<'_>,
        options: &ScrollOptions,
        at: Option<Coordinate>,
    ) {
        if !options.click_to_focus {
            return;
        }

        let target = match (options.focus_target, at) {
            (FocusTarget::Coordinate, Some(coordinate)) => coordinate,
            (FocusTarget::Coordinate, None) => return,
            (FocusTarget::Gutter, _) => Coordinate::from(self.display.gutter()),
        };

        if let Err(e) = pointer.focus_click(target).await {
            tracing::debug!(at = %target, error = %e, "Focus click failed, continuing");
        }
    }

    async fn prefocus_keys(&self, pointer: &PointerDispatcher<'_>, options: &ScrollOptions) {
        let timeout = self.timing.focus_key_timeout();

        if options.focus_strategy.sends_escape() {
            match self.press("Escape", timeout).await {
                Ok(_) => pointer.settle().await,
                Err(e) => tracing::debug!(error = %e, "Escape pre-focus failed, continuing"),
            }
        }

        if options.focus_strategy.sends_tab() {
            for _ in 0..options.focus_tab_count.min(MAX_FOCUS_TABS) {
                if let Err(e) = self.press("Tab", timeout).await {
                    tracing::debug!(error = %e, "Tab pre-focus failed, skipping remaining tabs");
                    break;
                }
                pointer.settle().await;
            }
        }
    }

    /// Try each key until the daemon accepts one.
    async fn step(&self, keys: &[&str]) -> Result<Value, GatewayError> {
        let mut last_error: Option<CallError> = None;

        for key in keys {
            match self.press(key, self.timing.scroll_key_timeout()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::debug!(key, error = %e, "Scroll key rejected, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(GatewayError::ScrollFailure { last: last_error })
    }

    /// Send one key. A 2xx answer means the key ran, even when its body
    /// cannot be decoded; such answers count as an empty response.
    async fn press(&self, key: &str, timeout: std::time::Duration) -> Result<Value, CallError> {
        match self
            .client
            .post_with_timeout(KEY_PATH, &json!({ "text": key }), timeout)
            .await
        {
            Err(e @ CallError::InvalidBody { .. }) => {
                tracing::debug!(key, error = %e, "Key accepted with undecodable body");
                Ok(Value::Object(Map::new()))
            }
            other => other,
        }
    }
}
