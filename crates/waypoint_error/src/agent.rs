//! Agent pipeline error types.

/// Agent-level error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AgentErrorKind {
    /// Generation succeeded but no parseable SQL was found in the response
    #[display("No SQL statement found in model response")]
    SqlExtraction,

    /// Text generation failed before any SQL existed
    #[display("Generation failed: {}", _0)]
    Generation(String),

    /// Reference-comparison step itself failed
    #[display("Validation failed: {}", _0)]
    Validation(String),
}

/// Agent error with source location tracking.
///
/// # Examples
///
/// ```
/// use waypoint_error::{AgentError, AgentErrorKind};
///
/// let err = AgentError::new(AgentErrorKind::SqlExtraction);
/// assert!(format!("{}", err).contains("No SQL"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Agent Error: {} at {}:{}", kind, file, line)]
pub struct AgentError {
    /// The specific error kind
    pub kind: AgentErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl AgentError {
    /// Create a new agent error.
    #[track_caller]
    pub fn new(kind: AgentErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
