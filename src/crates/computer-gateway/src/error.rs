//! Error types for the computer gateway.

use crate::client::CallError;
use thiserror::Error;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// A request violated an action's parameter constraints.
///
/// Raised before dispatch; no network call has been made when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create a validation error with a human-readable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Coarse classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Status,
    Timeout,
    Transport,
    InvalidBody,
    ScrollFailure,
    EmptyResponse,
    InvalidResponse,
    Config,
    Client,
}

/// Errors that can occur while executing an action.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad parameters; nothing was sent to the daemon.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A daemon call failed after its retries were exhausted.
    #[error("API request failed: {0}")]
    Call(#[from] CallError),

    /// No key in the scroll strategy was accepted for a step.
    #[error(
        "scroll failed: {}",
        .last.as_ref().map_or_else(|| "no key accepted".to_string(), |e| e.to_string())
    )]
    ScrollFailure { last: Option<CallError> },

    /// The scroll loop finished without recording a single daemon response.
    #[error("scroll action produced no response")]
    EmptyResponse,

    /// The daemon answered with a payload missing required fields.
    #[error("invalid daemon response: {0}")]
    InvalidResponse(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("Client error: {0}")]
    Client(String),
}

impl GatewayError {
    /// Classify the error without matching on its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Call(CallError::Status { .. }) => ErrorKind::Status,
            Self::Call(CallError::Timeout { .. }) => ErrorKind::Timeout,
            Self::Call(CallError::Transport { .. }) => ErrorKind::Transport,
            Self::Call(CallError::InvalidBody { .. }) => ErrorKind::InvalidBody,
            Self::ScrollFailure { .. } => ErrorKind::ScrollFailure,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::Config(_) => ErrorKind::Config,
            Self::Client(_) => ErrorKind::Client,
        }
    }

    /// Get the canonical error code for this error
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "E_VALIDATION",
            ErrorKind::Status => "E_STATUS",
            ErrorKind::Timeout => "E_TIMEOUT",
            ErrorKind::Transport => "E_TRANSPORT",
            ErrorKind::InvalidBody => "E_INVALID_BODY",
            ErrorKind::ScrollFailure => "E_SCROLL_FAILURE",
            ErrorKind::EmptyResponse => "E_EMPTY_RESPONSE",
            ErrorKind::InvalidResponse => "E_INVALID_RESPONSE",
            ErrorKind::Config => "E_CONFIG",
            ErrorKind::Client => "E_CLIENT",
        }
    }

    /// Whether the failure happened before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(err: serde_yaml::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}
