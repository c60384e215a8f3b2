//! Per-caller request rate limiting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use waypoint_error::{SecurityError, SecurityErrorKind};

/// Time source for the limiter, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock implementation of [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Sliding-window in-memory rate limiter keyed by caller identifier.
///
/// Single-process by design: the backing store is a mutex-guarded map, which
/// is sufficient for one deployment instance. Old timestamps are pruned on
/// every check.
///
/// # Examples
///
/// ```
/// use waypoint_security::{RateLimiter, SystemClock};
/// use std::sync::Arc;
///
/// let limiter = RateLimiter::new(2, 60, Arc::new(SystemClock));
/// assert!(limiter.check("10.0.0.1").is_ok());
/// assert!(limiter.check("10.0.0.1").is_ok());
/// assert!(limiter.check("10.0.0.1").is_err());
/// assert!(limiter.check("10.0.0.2").is_ok());
/// ```
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: std::sync::Arc<dyn Clock>,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window_seconds` per caller.
    pub fn new(max_requests: u32, window_seconds: u64, clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
            clock,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `identifier`, rejecting it when the window is full.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityErrorKind::RateLimited`] when the caller has already
    /// made the maximum number of requests within the current window.
    #[instrument(skip(self), fields(identifier))]
    pub fn check(&self, identifier: &str) -> Result<(), SecurityError> {
        let now = self.clock.now();
        let mut requests = self.requests.lock().expect("rate limit lock poisoned");

        let timestamps = requests.entry(identifier.to_string()).or_default();
        timestamps.retain(|ts| now.duration_since(*ts) < self.window);

        if timestamps.len() >= self.max_requests as usize {
            warn!(identifier, "Rate limit exceeded");
            return Err(SecurityError::new(SecurityErrorKind::RateLimited {
                max_requests: self.max_requests,
                window_seconds: self.window.as_secs(),
            }));
        }

        timestamps.push(now);
        debug!(identifier, in_window = timestamps.len(), "Request admitted");
        Ok(())
    }
}
