//! Gateway configuration.
//!
//! Configuration is layered: built-in defaults, then an optional YAML/JSON
//! file, then `COMPUTER_`-prefixed environment variables. Every section
//! deserializes with per-field defaults, so a file only needs the keys it
//! overrides.
//!
//! # Example
//!
//! ```rust,ignore
//! use computer_gateway::config::{load_config_file, GatewayConfig, ValidateConfig, ENV_PREFIX};
//!
//! let config: GatewayConfig = load_config_file("gateway.yaml")?;
//! let config = config.with_env_overrides(ENV_PREFIX)?;
//! config.validate()?;
//! ```

mod env;
mod loader;

pub use env::{build_env_key, get_env, get_env_bool, get_env_parse};
pub use loader::{load_config_file, load_json_config, load_yaml_config};

use crate::async_utils::retry::{seconds_to_duration, RetryPolicy};
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "COMPUTER_";

/// Default daemon address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8002";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_S: f64 = 30.0;

/// Distance from the bottom-right corner used as the scroll focus target.
const GUTTER_INSET: u32 = 5;

/// Trait for types that can be loaded from environment variables.
pub trait FromEnv: Sized {
    /// Load configuration from environment variables with the given prefix.
    fn from_env(prefix: &str) -> Result<Self>;
}

/// Trait for validating configuration.
pub trait ValidateConfig {
    /// Validate the configuration, returning an error if invalid.
    fn validate(&self) -> Result<()>;
}

/// Geometry of the remote display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub display_number: Option<u32>,
}

impl DisplayConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            display_number: None,
        }
    }

    pub fn with_display_number(mut self, number: u32) -> Self {
        self.display_number = Some(number);
        self
    }

    /// Point near the bottom-right corner, clamped at zero.
    pub fn gutter(&self) -> (u32, u32) {
        (
            self.width.saturating_sub(GUTTER_INSET),
            self.height.saturating_sub(GUTTER_INSET),
        )
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Pauses and per-key timeouts used by the pointer and scroll choreography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after a pointer move before acting
    pub settle_delay_s: f64,

    /// Pause after each scroll step
    pub step_delay_s: f64,

    /// Scroll steps between longer pauses
    pub batch_size: usize,

    /// Extra pause after every `batch_size` steps
    pub batch_pause_s: f64,

    /// Timeout for best-effort focus keys (Escape, Tab)
    pub focus_key_timeout_s: f64,

    /// Timeout for scroll step and boundary keys
    pub scroll_key_timeout_s: f64,
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        seconds_to_duration(self.settle_delay_s)
    }

    pub fn step_delay(&self) -> Duration {
        seconds_to_duration(self.step_delay_s)
    }

    pub fn batch_pause(&self) -> Duration {
        seconds_to_duration(self.batch_pause_s)
    }

    pub fn focus_key_timeout(&self) -> Duration {
        seconds_to_duration(self.focus_key_timeout_s)
    }

    pub fn scroll_key_timeout(&self) -> Duration {
        seconds_to_duration(self.scroll_key_timeout_s)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_s: 0.05,
            step_delay_s: 0.10,
            batch_size: 8,
            batch_pause_s: 0.25,
            focus_key_timeout_s: 10.0,
            scroll_key_timeout_s: 15.0,
        }
    }
}

/// Everything a gateway needs to reach one daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Daemon base URL, without a trailing slash
    pub base_url: String,

    /// Default per-request timeout in seconds
    pub request_timeout_s: f64,

    /// User agent sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    pub display: DisplayConfig,
    pub retry: RetryPolicy,
    pub timing: TimingConfig,
}

impl GatewayConfig {
    /// Create a configuration for `base_url` with default everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.request_timeout_s = seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Default per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        seconds_to_duration(self.request_timeout_s)
    }

    /// Overlay `<prefix>*` environment variables onto this configuration.
    pub fn with_env_overrides(mut self, prefix: &str) -> Result<Self> {
        let key = |name: &str| build_env_key(prefix, name);

        if let Some(base_url) = get_env(&key("base_url"))? {
            self.base_url = normalize_base_url(base_url);
        }
        if let Some(timeout) = get_env_parse(&key("timeout_s"))? {
            self.request_timeout_s = timeout;
        }
        if let Some(user_agent) = get_env(&key("user_agent"))? {
            self.user_agent = Some(user_agent);
        }
        if let Some(width) = get_env_parse(&key("display_width"))? {
            self.display.width = width;
        }
        if let Some(height) = get_env_parse(&key("display_height"))? {
            self.display.height = height;
        }
        if let Some(number) = get_env_parse(&key("display_number"))? {
            self.display.display_number = Some(number);
        }
        if let Some(retries) = get_env_parse(&key("max_retries"))? {
            self.retry.max_retries = retries;
        }
        if let Some(delay) = get_env_parse(&key("retry_base_delay_s"))? {
            self.retry.base_delay_s = delay;
        }
        if let Some(jitter) = get_env_bool(&key("retry_jitter"))? {
            self.retry.jitter = jitter;
        }

        Ok(self)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_s: DEFAULT_TIMEOUT_S,
            user_agent: None,
            display: DisplayConfig::default(),
            retry: RetryPolicy::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl FromEnv for GatewayConfig {
    fn from_env(prefix: &str) -> Result<Self> {
        Self::default().with_env_overrides(prefix)
    }
}

impl ValidateConfig for GatewayConfig {
    fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(GatewayError::Config("base_url must not be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::Config(format!(
                "base_url must start with http:// or https://, got {}",
                base_url
            )));
        }

        if !(self.request_timeout_s.is_finite() && self.request_timeout_s > 0.0) {
            return Err(GatewayError::Config(
                "request_timeout_s must be a positive number".into(),
            ));
        }

        if self.display.width == 0 || self.display.height == 0 {
            return Err(GatewayError::Config(
                "display width and height must be non-zero".into(),
            ));
        }

        check_delay("retry.base_delay_s", self.retry.base_delay_s)?;
        check_delay("retry.max_delay_s", self.retry.max_delay_s)?;
        if !(self.retry.backoff_factor.is_finite() && self.retry.backoff_factor >= 1.0) {
            return Err(GatewayError::Config(
                "retry.backoff_factor must be at least 1".into(),
            ));
        }

        if self.timing.batch_size == 0 {
            return Err(GatewayError::Config(
                "timing.batch_size must be non-zero".into(),
            ));
        }
        check_delay("timing.settle_delay_s", self.timing.settle_delay_s)?;
        check_delay("timing.step_delay_s", self.timing.step_delay_s)?;
        check_delay("timing.batch_pause_s", self.timing.batch_pause_s)?;
        check_delay("timing.focus_key_timeout_s", self.timing.focus_key_timeout_s)?;
        check_delay("timing.scroll_key_timeout_s", self.timing.scroll_key_timeout_s)?;

        Ok(())
    }
}

fn check_delay(name: &str, seconds: f64) -> Result<()> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(GatewayError::Config(format!(
            "{} must be a non-negative number, got {}",
            name, seconds
        )))
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}
