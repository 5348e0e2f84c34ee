//! Async utilities for daemon calls and choreography pauses
//!
//! This module provides:
//! - Retry policies with exponential backoff
//! - Sleeper and clock abstractions so delays can be injected
//!
//! # Example
//!
//! ```rust,ignore
//! use computer_gateway::async_utils::retry::{with_retry, RetryPolicy};
//! use computer_gateway::async_utils::time::TokioSleeper;
//!
//! async fn press_return(client: &RemoteCallClient) -> Result<Value, CallError> {
//!     let policy = RetryPolicy::new(2).with_base_delay(0.3);
//!
//!     with_retry(&policy, policy.max_retries, &TokioSleeper, || async {
//!         client.post("/input/key", &json!({"text": "Return"})).await
//!     })
//!     .await
//! }
//! ```

pub mod retry;
pub mod time;
