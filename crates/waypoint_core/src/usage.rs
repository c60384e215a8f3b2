//! Usage accounting for generation providers.
//!
//! The gateway records every attempt through an injected [`UsageSink`] rather
//! than an ambient global, so tests can pass a [`NoopUsage`] and observability
//! stays a read-only concern. No correctness depends on these counters.

use crate::Provider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Sink for per-provider usage counters.
///
/// Implementations must be safe under concurrent access; the gateway is
/// shared across request tasks.
pub trait UsageSink: Send + Sync {
    /// Record one request against a provider with its token count.
    fn record(&self, provider: Provider, tokens: u64);
}

/// Cumulative usage for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUsage {
    /// Number of requests answered by this provider
    pub requests: u64,
    /// Total tokens consumed through this provider
    pub tokens: u64,
}

/// Process-lifetime usage report, partitioned by provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Requests across all providers
    pub total_requests: u64,
    /// Tokens across all providers
    pub total_tokens: u64,
    /// Per-provider breakdown
    pub by_provider: HashMap<Provider, ProviderUsage>,
}

/// Thread-safe in-memory usage metrics.
///
/// # Examples
///
/// ```
/// use waypoint_core::{Provider, UsageMetrics, UsageSink};
///
/// let metrics = UsageMetrics::default();
/// metrics.record(Provider::Groq, 120);
/// metrics.record(Provider::Groq, 80);
///
/// let report = metrics.snapshot();
/// assert_eq!(report.total_requests, 2);
/// assert_eq!(report.by_provider[&Provider::Groq].tokens, 200);
/// ```
#[derive(Debug, Default)]
pub struct UsageMetrics {
    inner: Mutex<UsageReport>,
}

impl UsageMetrics {
    /// Read-only snapshot of the counters.
    pub fn snapshot(&self) -> UsageReport {
        self.inner.lock().expect("usage lock poisoned").clone()
    }
}

impl UsageSink for UsageMetrics {
    fn record(&self, provider: Provider, tokens: u64) {
        let mut report = self.inner.lock().expect("usage lock poisoned");
        report.total_requests += 1;
        report.total_tokens += tokens;
        let entry = report.by_provider.entry(provider).or_default();
        entry.requests += 1;
        entry.tokens += tokens;
    }
}

/// Usage sink that discards everything. Intended for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsage;

impl UsageSink for NoopUsage {
    fn record(&self, _provider: Provider, _tokens: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_partition_by_provider() {
        let metrics = UsageMetrics::default();
        metrics.record(Provider::Groq, 10);
        metrics.record(Provider::Gemini, 5);
        metrics.record(Provider::Gemini, 7);

        let report = metrics.snapshot();
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.total_tokens, 22);
        assert_eq!(report.by_provider[&Provider::Groq].requests, 1);
        assert_eq!(report.by_provider[&Provider::Gemini].requests, 2);
        assert_eq!(report.by_provider[&Provider::Gemini].tokens, 12);
    }

    #[test]
    fn snapshot_is_detached() {
        let metrics = UsageMetrics::default();
        metrics.record(Provider::Local, 1);
        let before = metrics.snapshot();
        metrics.record(Provider::Local, 1);
        assert_eq!(before.total_requests, 1);
        assert_eq!(metrics.snapshot().total_requests, 2);
    }
}
