//! SQL security gate error types.

/// Reasons the security gate rejects a statement.
///
/// The `Display` text of each variant is the reason surfaced to callers, so
/// the wording is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SecurityErrorKind {
    /// Statement is empty after trimming
    #[display("Empty query")]
    EmptyQuery,

    /// A destructive keyword appeared as a whole word
    #[display("Blocked keyword detected: {}", _0)]
    BlockedKeyword(String),

    /// More than one statement separator found
    #[display("Multiple statements not allowed")]
    MultipleStatements,

    /// Statement does not begin with SELECT
    #[display("Only SELECT queries are allowed")]
    NotSelect,

    /// Too many comment markers for a single statement
    #[display("Suspicious comment patterns detected")]
    SuspiciousComments,

    /// Caller exceeded the request rate limit
    #[display("Rate limit exceeded: max {} requests per {}s", max_requests, window_seconds)]
    RateLimited {
        /// Maximum requests allowed in one window
        max_requests: u32,
        /// Window length in seconds
        window_seconds: u64,
    },
}

/// Security error with source location tracking.
///
/// # Examples
///
/// ```
/// use waypoint_error::{SecurityError, SecurityErrorKind};
///
/// let err = SecurityError::new(SecurityErrorKind::EmptyQuery);
/// assert!(format!("{}", err).contains("Empty query"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Security Error: {} at {}:{}", kind, file, line)]
pub struct SecurityError {
    /// The specific error kind
    pub kind: SecurityErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl SecurityError {
    /// Create a new security error.
    #[track_caller]
    pub fn new(kind: SecurityErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The violated rule, without the location suffix.
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}
