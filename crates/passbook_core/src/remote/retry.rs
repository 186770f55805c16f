//! Retry policy for remote sync calls.
//!
//! Exponential backoff with jitter, retrying transient failures only:
//! timeouts and connection drops, 429s, and 5xx responses. Validation and
//! not-found answers fail fast — repeating them cannot change the outcome.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff time in milliseconds.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Maximum backoff time in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Jitter range in milliseconds (added to backoff).
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_jitter_ms() -> u64 {
    250
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

/// Run a remote call with the configured retry policy.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    op: &'static str,
    mut call: F,
) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_attempts && is_retryable(&err) => {
                let wait_ms = calculate_backoff(attempt, config);
                tracing::warn!(op, attempt, wait_ms, error = %err, "remote call failed, retrying");
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Whether an error is worth retrying.
pub(crate) fn is_retryable(err: &CoreError) -> bool {
    match err {
        CoreError::Http(e) => e.is_timeout() || e.is_connect(),
        CoreError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Calculate exponential backoff with cap: doubles from the base per attempt.
pub(crate) fn calculate_backoff(attempt: u32, config: &RetryConfig) -> u64 {
    let exponential = config
        .base_backoff_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exponential.min(config.max_backoff_ms);
    let jitter = if config.jitter_ms > 0 {
        rand::rng().random_range(0..config.jitter_ms)
    } else {
        0
    };
    capped.saturating_add(jitter)
}
