//! Retry with exponential back-off and jitter for hub requests.
//!
//! The hub is frequently overloaded; 5xx responses and timeouts are common
//! and usually clear within seconds. Everything else fails fast.

use std::future::Future;
use std::time::Duration;

use crate::error::CopernicusError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay:
/// timeouts, connection failures, HTTP 429 and 5xx.
pub(crate) fn is_retriable(err: &CopernicusError) -> bool {
    match err {
        CopernicusError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        CopernicusError::MissingCredentials
        | CopernicusError::InvalidBaseUrl { .. }
        | CopernicusError::Deserialize { .. }
        | CopernicusError::Source(_) => false,
    }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped at
/// 60 s, then scaled by a jitter factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32, jitter: f64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (jitter * 0.5 + 0.75)) as u64
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CopernicusError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CopernicusError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt, rand::random::<f64>());
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Copernicus transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
