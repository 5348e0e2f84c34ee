//! Logging utilities
//!
//! Helpers for structured logging with tracing. Daemon payloads can carry
//! base64 screenshots of several hundred kilobytes, so anything logged from a
//! payload goes through [`summarize_payload`] first.

use crate::async_utils::time::Clock;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;

/// Strings longer than this are replaced by a size marker when logged.
pub const MAX_LOGGED_STRING: usize = 256;

/// Log execution time of a future, measured on `clock`
///
/// # Example
///
/// ```rust,ignore
/// use computer_gateway::logging::timed;
/// use computer_gateway::SystemClock;
///
/// let clock = SystemClock::new();
/// let result = timed("screenshot", &clock, gateway.execute(request)).await;
/// ```
pub async fn timed<F, T>(name: &str, clock: &dyn Clock, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = clock.elapsed();
    debug!("Starting: {}", name);

    let result = future.await;

    let elapsed = clock.elapsed().saturating_sub(start);
    debug!(
        elapsed_ms = elapsed.as_millis() as u64,
        "Completed: {} in {}",
        name,
        format_duration(elapsed)
    );

    result
}

/// RAII guard for logging scope entry and exit
///
/// ```rust
/// use computer_gateway::logging::LogGuard;
///
/// fn load() {
///     let _guard = LogGuard::new("load");
/// }
/// ```
pub struct LogGuard {
    name: String,
    start: Instant,
}

impl LogGuard {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("Entering: {}", name);

        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Get elapsed time since guard creation
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        debug!(
            "Exiting: {} (elapsed: {})",
            self.name,
            format_duration(self.start.elapsed())
        );
    }
}

/// Format duration in human-readable form
///
/// ```rust
/// use computer_gateway::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}

/// Format bytes in human-readable form
///
/// ```rust
/// use computer_gateway::logging::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(500), "500 B");
/// ```
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Copy of `payload` with long strings replaced by `<N bytes>` markers.
pub fn summarize_payload(payload: &Value) -> Value {
    match payload {
        Value::String(s) if s.len() > MAX_LOGGED_STRING => {
            Value::String(format!("<{}>", format_bytes(s.len())))
        }
        Value::Array(items) => Value::Array(items.iter().map(summarize_payload).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), summarize_payload(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}
