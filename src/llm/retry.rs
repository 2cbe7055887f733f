use std::future::Future;
use std::time::Duration;

use log::warn;

/// Backoff policy for transient upstream failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 means a single attempt.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the retry that follows `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let pow = self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = ((self.initial_backoff_ms as f32) * pow) as u64;
        Duration::from_millis(delay_ms.min(self.max_backoff_ms))
    }
}

/// Runs `operation` until it succeeds, fails with an error `is_transient`
/// rejects, or the retry budget is spent. The last error is returned.
pub async fn with_retry<Op, Fut, T, E, Transient>(
    config: &RetryConfig,
    mut operation: Op,
    is_transient: Transient,
) -> Result<T, E>
    where
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Transient: Fn(&E) -> bool,
        E: std::fmt::Display
{
    let mut attempt: u32 = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && is_transient(&e) => {
                let delay = config.delay_for(attempt);
                warn!(
                    "Transient upstream failure (attempt {}/{}): {}. Retrying in {} ms",
                    attempt + 1,
                    config.max_retries + 1,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e);
            }
        }
    }
}
