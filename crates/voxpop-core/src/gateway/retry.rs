//! The retrying gateway wrapper around a `TextGenerator`.

use super::meter::UsageMeter;
use super::provider::{GatewayError, GenerationRequest, ProviderResult, TextGenerator};
use crate::error::{Result, VoxError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Retry and timeout discipline for provider calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts for a transiently failing call.
    pub max_attempts: u32,
    /// Backoff after attempt `n` is `n × backoff_unit`.
    pub backoff_unit: Duration,
    /// Wall-clock bound for a single provider round-trip.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(2),
            call_timeout: Duration::from_secs(120),
        }
    }
}

/// Wraps a `TextGenerator` with bounded retries, linear backoff, per-call
/// timeouts, and character metering.
///
/// Transient provider failures are retried up to `max_attempts` times and
/// then escalated to `ServiceUnavailable`; all other provider failures
/// propagate immediately. On every successful call the meter passed by the
/// caller records the characters sent and received.
pub struct Gateway {
    provider: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl Gateway {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(provider: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Runs a request through the provider, metering on success.
    pub async fn generate(&self, request: &GenerationRequest, meter: &UsageMeter) -> Result<String> {
        let mut last_message = String::new();

        for attempt in 1..=self.policy.max_attempts {
            let outcome = timeout(self.policy.call_timeout, self.provider.generate(request)).await;

            let error = match outcome {
                Ok(Ok(text)) => {
                    meter.record(request.input_chars(), text.chars().count() as u64);
                    return Ok(text);
                }
                Ok(Err(err)) => err,
                // A timed-out round-trip counts as a transient condition.
                Err(_) => GatewayError::overloaded(format!(
                    "call exceeded {}s timeout",
                    self.policy.call_timeout.as_secs()
                )),
            };

            match error {
                GatewayError::Overloaded {
                    message,
                    retry_after,
                } => {
                    tracing::warn!(
                        target: "gateway",
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        "transient provider failure: {message}"
                    );
                    last_message = message;
                    if attempt < self.policy.max_attempts {
                        let backoff = self.policy.backoff_unit * attempt;
                        sleep(retry_after.unwrap_or(backoff).max(backoff)).await;
                    }
                }
                GatewayError::Provider { message } => {
                    tracing::error!(target: "gateway", "provider failure: {message}");
                    return Err(VoxError::provider(message));
                }
            }
        }

        Err(VoxError::service_unavailable(format!(
            "provider still overloaded after {} attempts: {last_message}",
            self.policy.max_attempts
        )))
    }

    /// Convenience wrapper for single-prompt requests.
    pub async fn generate_prompt(
        &self,
        prompt: &str,
        temperature: f32,
        meter: &UsageMeter,
    ) -> Result<String> {
        self.generate(&GenerationRequest::from_prompt(prompt, temperature), meter)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AlwaysOverloaded {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for AlwaysOverloaded {
        async fn generate(&self, _request: &GenerationRequest) -> ProviderResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::overloaded("model is overloaded"))
        }
    }

    struct FailsNonRetryably {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for FailsNonRetryably {
        async fn generate(&self, _request: &GenerationRequest) -> ProviderResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::provider("invalid API key"))
        }
    }

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, request: &GenerationRequest) -> ProviderResult {
            Ok(request.turns.last().unwrap().text.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overloaded_call_is_attempted_exactly_three_times() {
        let provider = Arc::new(AlwaysOverloaded {
            calls: AtomicU32::new(0),
        });
        let gateway = Gateway::new(provider.clone());
        let meter = UsageMeter::new();

        let started = tokio::time::Instant::now();
        let err = gateway
            .generate_prompt("hello", 0.8, &meter)
            .await
            .unwrap_err();

        assert!(err.is_service_unavailable(), "got {err:?}");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        // Linear backoff: 2s after the first attempt, 4s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
        // Failed calls are never metered.
        assert_eq!(meter.snapshot().input_chars, 0);
    }

    #[tokio::test]
    async fn non_retryable_failure_propagates_without_retry() {
        let provider = Arc::new(FailsNonRetryably {
            calls: AtomicU32::new(0),
        });
        let gateway = Gateway::new(provider.clone());
        let meter = UsageMeter::new();

        let err = gateway
            .generate_prompt("hello", 0.8, &meter)
            .await
            .unwrap_err();

        assert!(matches!(err, VoxError::Provider { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_call_meters_both_directions() {
        let gateway = Gateway::new(Arc::new(Echo));
        let meter = UsageMeter::new();

        let reply = gateway
            .generate_prompt("four", 0.8, &meter)
            .await
            .unwrap();

        assert_eq!(reply, "four");
        let snap = meter.snapshot();
        assert_eq!(snap.input_chars, 4);
        assert_eq!(snap.output_chars, 4);
    }
}
