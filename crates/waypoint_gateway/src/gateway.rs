//! Ordered-fallback gateway over the registered drivers.

use crate::{DriverReply, GenerationDriver};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, info, instrument, warn};
use waypoint_core::{GenerateRequest, Generation, NoopUsage, Provider, UsageSink};
use waypoint_error::{GatewayError, GatewayErrorKind};

/// Bounded retry settings for a single driver attempt.
///
/// Delays grow exponentially from `base_delay` with jitter, capped at
/// `max_delay`; `max_retries` extra attempts follow the initial one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// First backoff delay
    pub base_delay: Duration,
    /// Ceiling for any backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    fn strategy(&self) -> impl Iterator<Item = Duration> {
        // from_millis(2).factor(base/2) yields base, 2*base, 4*base, ...
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_retries)
    }
}

/// Uniform entry point to every text-generation backend.
///
/// Holds the drivers in fixed priority order; a request's preferred provider
/// is tried first (with per-attempt retry), then the remaining drivers in
/// registration order until one succeeds. Attempts are sequential, never
/// raced.
pub struct Gateway {
    drivers: Vec<Arc<dyn GenerationDriver>>,
    usage: Arc<dyn UsageSink>,
    retry: RetryPolicy,
}

/// Builder for [`Gateway`].
#[derive(Default)]
pub struct GatewayBuilder {
    drivers: Vec<Arc<dyn GenerationDriver>>,
    usage: Option<Arc<dyn UsageSink>>,
    retry: Option<RetryPolicy>,
}

impl GatewayBuilder {
    /// Append a driver to the fallback chain.
    pub fn driver(mut self, driver: Arc<dyn GenerationDriver>) -> Self {
        self.drivers.push(driver);
        self
    }

    /// Inject the usage sink; defaults to a no-op sink.
    pub fn usage(mut self, usage: Arc<dyn UsageSink>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Override the per-driver retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Finish building the gateway.
    pub fn build(self) -> Gateway {
        Gateway {
            drivers: self.drivers,
            usage: self.usage.unwrap_or_else(|| Arc::new(NoopUsage)),
            retry: self.retry.unwrap_or_default(),
        }
    }
}

impl Gateway {
    /// Start building a gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Generate text, falling back across drivers until one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayErrorKind::AllProvidersExhausted`] only when every
    /// driver in the chain has failed, or
    /// [`GatewayErrorKind::UnknownProvider`] when the request names a
    /// provider no driver speaks for.
    #[instrument(skip(self, req), fields(requested = ?req.provider))]
    pub async fn generate(&self, req: &GenerateRequest) -> Result<Generation, GatewayError> {
        let started = Instant::now();
        let order = self.attempt_order(req.provider)?;

        let mut last_error: Option<GatewayError> = None;
        for (position, driver) in order.into_iter().enumerate() {
            let provider = driver.provider();
            if position > 0 {
                info!(provider = %provider, "Trying fallback provider");
            }

            match self.attempt_with_retry(driver.as_ref(), req).await {
                Ok(reply) => {
                    let tokens = reply
                        .tokens
                        .unwrap_or_else(|| estimate_tokens(&req.prompt, &reply.text));
                    self.usage.record(provider, tokens);

                    let generation = Generation::builder()
                        .text(reply.text)
                        .provider(provider)
                        .model(reply.model)
                        .tokens(tokens)
                        .duration_ms(started.elapsed().as_millis() as u64)
                        .fallback_used(position > 0)
                        .build()
                        .expect("all generation fields set");

                    debug!(provider = %provider, tokens, "Generation succeeded");
                    return Ok(generation);
                }
                Err(e) => {
                    error!(provider = %provider, error = %e, "Provider failed, continuing down the chain");
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .map(|e| e.kind.to_string())
            .unwrap_or_else(|| "no drivers registered".to_string());
        Err(GatewayError::new(GatewayErrorKind::AllProvidersExhausted(
            last,
        )))
    }

    /// Primary driver first, then the rest in registration order.
    fn attempt_order(
        &self,
        requested: Option<Provider>,
    ) -> Result<Vec<Arc<dyn GenerationDriver>>, GatewayError> {
        let primary = match requested {
            Some(provider) => self
                .drivers
                .iter()
                .position(|d| d.provider() == provider)
                .ok_or_else(|| {
                    GatewayError::new(GatewayErrorKind::UnknownProvider(provider.to_string()))
                })?,
            None => 0,
        };

        let mut order = Vec::with_capacity(self.drivers.len());
        if let Some(first) = self.drivers.get(primary) {
            order.push(Arc::clone(first));
        }
        for (idx, driver) in self.drivers.iter().enumerate() {
            if idx != primary {
                order.push(Arc::clone(driver));
            }
        }
        Ok(order)
    }

    /// One driver attempt, wrapped with bounded exponential-backoff retry to
    /// absorb transient errors before the driver counts as failed.
    async fn attempt_with_retry(
        &self,
        driver: &dyn GenerationDriver,
        req: &GenerateRequest,
    ) -> Result<DriverReply, GatewayError> {
        Retry::spawn(self.retry.strategy(), || async {
            match driver.generate(req).await {
                Ok(reply) => Ok(reply),
                Err(e) => {
                    let retryable = matches!(
                        &e.kind,
                        GatewayErrorKind::Provider { kind, .. } if kind.is_retryable()
                    );
                    if retryable {
                        warn!(error = %e, "Transient provider error, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}

/// Best-effort token estimate when a provider reports no usage.
fn estimate_tokens(prompt: &str, response: &str) -> u64 {
    (prompt.split_whitespace().count() + response.split_whitespace().count()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_counts_both_sides() {
        assert_eq!(estimate_tokens("one two three", "four five"), 5);
        assert_eq!(estimate_tokens("", ""), 0);
    }

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
    }
}
