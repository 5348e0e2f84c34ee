//! Input-action gateway for remote desktop automation daemons
//!
//! An automated caller (an agent or a script) drives a sandboxed desktop by
//! submitting semantic actions: click, type, scroll, screenshot. The gateway
//! validates each action, translates it into one or more primitive HTTP calls
//! against the automation daemon running inside the session, and makes that
//! translation resilient to transient failures.
//!
//! # Modules
//!
//! - `action` - Action kinds, raw requests and validated actions
//! - `validation` - Parameter checks that run before any network activity
//! - `client` - Remote call client with timeout and exponential backoff
//! - `pointer` - Move-then-act choreography for pointer actions
//! - `scroll` - Key-event scroll emulation
//! - `result` - Uniform tool results and daemon response normalization
//! - `gateway` - The entry point tying the pieces together
//! - `computer` - Typed client for the flat v2 daemon surface
//! - `config` - Gateway configuration from defaults, files and environment
//! - `async_utils` - Retry policy, sleeper and clock abstractions
//! - `logging` - Structured logging helpers
//! - `tool` - Tool definition advertised to LLM tool-use APIs
//!
//! # Example
//!
//! ```rust,ignore
//! use computer_gateway::{ActionKind, ActionRequest, ComputerGateway, GatewayConfig};
//!
//! let gateway = ComputerGateway::new(GatewayConfig::new("http://localhost:8002"))?;
//!
//! let request = ActionRequest::new(ActionKind::LeftClick).with_coordinate(640, 400);
//! let result = gateway.execute(request).await?;
//! if let Some(error) = result.error() {
//!     eprintln!("click failed: {}", error);
//! }
//! ```

pub mod action;
pub mod async_utils;
pub mod client;
pub mod computer;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod pointer;
pub mod result;
pub mod scroll;
pub mod tool;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{Action, ActionKind, ActionRequest, ClickButton, Coordinate, WaitDuration};
pub use async_utils::retry::RetryPolicy;
pub use async_utils::time::{Clock, ManualClock, Sleeper, SystemClock, TokioSleeper};
pub use client::{CallError, DaemonRequest, DaemonTransport, HttpTransport, RawResponse, RemoteCallClient};
pub use computer::DesktopClient;
pub use config::{DisplayConfig, FromEnv, GatewayConfig, TimingConfig, ValidateConfig};
pub use error::{ErrorKind, GatewayError, Result, ValidationError};
pub use gateway::ComputerGateway;
pub use result::ToolResult;
pub use scroll::{FocusStrategy, FocusTarget, Granularity, ScrollDirection, ScrollOptions};
pub use tool::ToolDefinition;
pub use validation::validate;

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
