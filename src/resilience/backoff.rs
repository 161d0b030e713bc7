//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Calculate exponential backoff delay with jitter.
///
/// Attempt 0 is the first try and never waits; attempt `n` waits
/// `base * 2^(n-1)`, capped at `max`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Delay before `attempt` under `policy`.
pub fn retry_delay(attempt: u32, policy: &RetryConfig) -> Duration {
    calculate_backoff(attempt, policy.base_delay_ms, policy.max_delay_ms)
}
