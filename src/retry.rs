use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::Result;
use crate::report::Reporter;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;

/// Upper bound of the uniform jitter added to every backoff wait.
const JITTER_MAX_MS: u64 = 1_000;

/// Message fragments that mark a failure as transient. Best-effort
/// heuristic, not a structured error-code contract with the provider.
const TRANSIENT_FRAGMENTS: [&str; 4] = ["overloaded", "503", "fetch failed", "network error"];

/// Retry budget applied around one remote call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay_ms: u64) -> Self {
        Self {
            retries,
            base_delay_ms,
        }
    }
}

/// Whether a failure is worth retrying: overload/rate-limit statuses, or
/// any of the known transient message fragments.
pub fn is_transient(status: Option<u16>, message: &str) -> bool {
    if matches!(status, Some(503) | Some(429)) {
        return true;
    }
    let lower = message.to_lowercase();
    TRANSIENT_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Backoff wait for one retry round. Pure so tests can drive it with a
/// chosen jitter instead of a live RNG.
pub fn backoff_delay(base_delay_ms: u64, jitter_ms: u64) -> Duration {
    Duration::from_millis(base_delay_ms + jitter_ms)
}

/// Run one remote call with bounded exponential backoff.
///
/// Transient failures are retried up to `policy.retries` extra attempts,
/// doubling the base delay each round with uniform jitter on top. A
/// permanent failure, or a transient one with the budget exhausted, emits
/// one error record (best-effort) and re-raises the original error.
///
/// Wraps exactly one remote call; multi-stage pipelines apply it
/// independently at each stage.
pub async fn with_retry<T, F, Fut>(
    reporter: &Reporter,
    source: &str,
    policy: RetryPolicy,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut remaining = policy.retries;
    let mut delay_ms = policy.base_delay_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let transient = is_transient(err.status(), &err.to_string());
                if transient && remaining > 0 {
                    let jitter = rand::thread_rng().gen_range(0..JITTER_MAX_MS);
                    let wait = backoff_delay(delay_ms, jitter);
                    log::warn!(
                        "{} attempt failed transiently ({}), retrying in {}ms ({} retries left)",
                        source,
                        err,
                        wait.as_millis(),
                        remaining
                    );
                    tokio::time::sleep(wait).await;
                    remaining -= 1;
                    delay_ms *= 2;
                    continue;
                }

                // Best-effort ledger write; never masks the original error.
                reporter.error(source, &err.to_string());
                return Err(err);
            }
        }
    }
}
