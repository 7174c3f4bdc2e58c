//! Exponential backoff for connection attempts.

use std::future::Future;
use std::time::Duration;

use crate::error::{GrpcError, GrpcResult};

/// Backoff schedule: `initial_backoff * multiplier^n`, capped at `max_backoff`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
  /// Attempts after the first one
  pub max_retries: u32,
  pub initial_backoff: Duration,
  pub max_backoff: Duration,
  pub multiplier: u32,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_retries: 3,
      initial_backoff: Duration::from_millis(200),
      max_backoff: Duration::from_secs(5),
      multiplier: 2,
    }
  }
}

impl RetryConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = max_retries;
    self
  }

  pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
    self.initial_backoff = backoff;
    self
  }

  pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
    self.max_backoff = backoff;
    self
  }

  /// Delay before retry number `retry` (0-based)
  pub fn backoff_for(&self, retry: u32) -> Duration {
    let factor = self.multiplier.saturating_pow(retry);
    self
      .initial_backoff
      .saturating_mul(factor)
      .min(self.max_backoff)
  }
}

/// [`retry_with_backoff`] with the default schedule
pub async fn retry<T, F, Fut>(operation: F) -> GrpcResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = GrpcResult<T>>,
{
  retry_with_backoff(operation, RetryConfig::default()).await
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// runs out of attempts.
pub async fn retry_with_backoff<T, F, Fut>(mut operation: F, config: RetryConfig) -> GrpcResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = GrpcResult<T>>,
{
  let mut attempt = 0;
  loop {
    match operation().await {
      Ok(value) => return Ok(value),
      Err(e) if !e.is_retryable() => return Err(e),
      Err(e) if attempt >= config.max_retries => {
        return Err(GrpcError::MaxRetriesExceeded {
          attempts: attempt + 1,
          last: Box::new(e),
        });
      }
      Err(e) => {
        let delay = config.backoff_for(attempt);
        tracing::warn!(
          target: "grpc_client",
          attempt = attempt + 1,
          delay_ms = delay.as_millis() as u64,
          error = %e,
          "Attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
    }
  }
}
