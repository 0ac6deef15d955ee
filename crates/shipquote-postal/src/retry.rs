//! Retry with exponential back-off and jitter for the postal client.

use std::future::Future;
use std::time::Duration;

use crate::error::PostalError;

/// Returns `true` for network failures and 5xx responses. A missing or
/// incomplete address will not change on a second attempt.
pub(crate) fn is_retriable(err: &PostalError) -> bool {
    match err {
        PostalError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PostalError::NotFound(_)
        | PostalError::Incomplete(_)
        | PostalError::Deserialize { .. }
        | PostalError::InvalidBaseUrl { .. } => false,
    }
}

const MAX_DELAY_MS: u64 = 5_000;

/// Back-off before retry number `attempt` (1-based), before jitter.
fn base_delay_ms(attempt: u32, backoff_base_ms: u64) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS)
}

/// Longest total sleep `max_retries` retries can add, with jitter at its
/// upper bound.
pub(crate) fn worst_case_backoff_ms(max_retries: u32, backoff_base_ms: u64) -> u64 {
    (1..=max_retries)
        .map(|attempt| base_delay_ms(attempt, backoff_base_ms).saturating_mul(5) / 4 + 1)
        .fold(0u64, u64::saturating_add)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors, sleeping `backoff_base_ms × 2ⁿ ± 25 %` between attempts (capped at
/// 5 s).
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PostalError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PostalError>>,
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
                let capped = base_delay_ms(attempt, backoff_base_ms);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "postal lookup transient error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn not_found_is_not_retriable() {
        assert!(!is_retriable(&PostalError::NotFound("01001000".to_owned())));
        assert!(!is_retriable(&PostalError::Incomplete("01001000".to_owned())));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(PostalError::NotFound("00000000".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PostalError::NotFound(_))));
    }

    #[test]
    fn worst_case_backoff_sums_capped_delays_with_jitter() {
        assert_eq!(worst_case_backoff_ms(0, 250), 0);
        // 250 and 500 ms, each scaled by 1.25 plus rounding slack.
        assert_eq!(worst_case_backoff_ms(2, 250), 313 + 626);
        // Delays cap at 5 s.
        assert_eq!(worst_case_backoff_ms(1, 60_000), 6_251);
    }

    #[tokio::test]
    async fn retries_connect_error_then_gives_up() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                let err = reqwest::Client::new()
                    .get("http://0.0.0.0:1")
                    .send()
                    .await
                    .unwrap_err();
                Err::<u32, _>(PostalError::Http(err))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
    }
}
