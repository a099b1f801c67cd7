use shared::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Exponential backoff settings for RPC calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Upper bound for any single wait
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            ..Self::default()
        }
    }
}

impl RetryConfig {
    /// Wait before retrying after the given (0-indexed) failed attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(scaled as u64).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` is exhausted.
///
/// The error of the final attempt is returned. No wait follows the last attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        debug!("'{}' attempt {}/{}", operation_name, attempt + 1, attempts);

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 >= attempts => {
                warn!("'{}' gave up after {} attempts: {}", operation_name, attempts, e);
                return Err(e);
            }
            Err(e) => {
                let delay = config.calculate_delay(attempt);
                warn!(
                    "'{}' failed on attempt {}/{}: {} (retrying in {:?})",
                    operation_name,
                    attempt + 1,
                    attempts,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
