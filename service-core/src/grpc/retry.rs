//! gRPC client retry utilities.
//!
//! Exponential backoff with jitter for transient failures. Callers decide
//! whether an operation is safe to repeat; `Increment` is pure, so the calc
//! client may retry it.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tonic::{Code, Status};
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add up to 25% jitter to the backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn no_retry() -> Self {
        Self::with_max_retries(0)
    }

    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            let jitter = (backoff_ms as f64 * 0.25 * rand::random::<f64>()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

/// Whether a failed call may succeed if repeated.
pub fn is_retryable(status: &Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable
            | Code::ResourceExhausted
            | Code::Aborted
            | Code::DeadlineExceeded
            | Code::Unknown
    )
}

/// Execute a gRPC call, retrying transient failures per `config`.
///
/// ```ignore
/// let val = retry_grpc_call(&RetryConfig::default(), "increment", || async {
///     client.clone().increment(NumRequest { val: 1 }).await.map(|r| r.into_inner().val)
/// }).await?;
/// ```
pub async fn retry_grpc_call<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, Status>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, Status>>,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "gRPC call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(status) => {
                if !is_retryable(&status) {
                    return Err(status);
                }

                if attempt >= config.max_retries {
                    if config.max_retries > 0 {
                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            code = ?status.code(),
                            error = %status.message(),
                            "gRPC call failed after max retries"
                        );
                    }
                    return Err(status);
                }

                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    code = ?status.code(),
                    error = %status.message(),
                    backoff_ms = backoff.as_millis() as u64,
                    "gRPC call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
