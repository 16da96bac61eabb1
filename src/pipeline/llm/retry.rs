//! Exponential backoff around any `LlmClient`.

use std::time::Duration;

use super::{LlmClient, LlmError};

/// Bounded exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// Retries transient upstream faults; everything else passes straight through.
pub struct RetryingLlmClient<C> {
    inner: C,
    policy: RetryPolicy,
    sleep: fn(Duration),
}

impl<C: LlmClient> RetryingLlmClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleep: std::thread::sleep,
        }
    }

    /// Replace the sleeper (tests use a no-op).
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn with_backoff<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> Result<T, LlmError>,
    ) -> Result<T, LlmError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt - 1);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying"
                    );
                    (self.sleep)(delay);
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!(operation, attempts = attempt, error = %e, "retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}

impl<C: LlmClient> LlmClient for RetryingLlmClient<C> {
    fn generate(&self, model: &str, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        self.with_backoff("generate", || self.inner.generate(model, prompt, system))
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        self.with_backoff("is_model_available", || self.inner.is_model_available(model))
    }
}
