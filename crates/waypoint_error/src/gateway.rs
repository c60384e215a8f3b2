//! Generation gateway and provider error types.

/// Error conditions a single generation provider can report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Request could not be sent or the connection failed
    #[display("HTTP error: {}", _0)]
    Http(String),

    /// Provider API returned a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body or status message
        message: String,
    },

    /// Provider signalled rate limiting (HTTP 429)
    #[display("Rate limit exceeded")]
    RateLimit,

    /// Required API key is not configured
    #[display("API key not configured: {}", _0)]
    MissingApiKey(String),

    /// Provider response could not be parsed into the expected shape
    #[display("Response parsing error: {}", _0)]
    ResponseParsing(String),

    /// Request was rejected as malformed before being sent
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
}

impl ProviderErrorKind {
    /// Whether a retry within the same provider is worthwhile.
    ///
    /// Configuration and request-shape errors fail every attempt identically,
    /// so only network and rate-limit conditions are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimit => true,
            Self::Api { status, .. } => *status >= 500,
            Self::MissingApiKey(_) | Self::ResponseParsing(_) | Self::InvalidRequest(_) => false,
        }
    }
}

/// Gateway-level error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GatewayErrorKind {
    /// A specific provider failed
    #[display("Provider '{}' failed: {}", provider, kind)]
    Provider {
        /// Name of the failed provider
        provider: &'static str,
        /// The provider-level failure
        kind: ProviderErrorKind,
    },

    /// Every provider in the fallback chain failed
    #[display("All providers exhausted, last error: {}", _0)]
    AllProvidersExhausted(String),

    /// Unknown provider name requested by the caller
    #[display("Unknown provider: {}", _0)]
    UnknownProvider(String),
}

/// Gateway error with source location tracking.
///
/// # Examples
///
/// ```
/// use waypoint_error::{GatewayError, GatewayErrorKind};
///
/// let err = GatewayError::new(GatewayErrorKind::AllProvidersExhausted(
///     "timed out".to_string(),
/// ));
/// assert!(format!("{}", err).contains("exhausted"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at {}:{}", kind, file, line)]
pub struct GatewayError {
    /// The specific error kind
    pub kind: GatewayErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl GatewayError {
    /// Create a new gateway error.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Convenience constructor for a single provider failure.
    #[track_caller]
    pub fn provider(provider: &'static str, kind: ProviderErrorKind) -> Self {
        Self::new(GatewayErrorKind::Provider { provider, kind })
    }
}
