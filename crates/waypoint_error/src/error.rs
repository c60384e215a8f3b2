//! Top-level error wrapper types.

use crate::{AgentError, DatabaseError, GatewayError, SecurityError};

/// The foundation error enum covering every Waypoint subsystem.
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WaypointErrorKind {
    /// Generation gateway error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Security gate error
    #[from(SecurityError)]
    Security(SecurityError),
    /// Database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Agent pipeline error
    #[from(AgentError)]
    Agent(AgentError),
}

/// Waypoint error with kind discrimination.
///
/// # Examples
///
/// ```
/// use waypoint_error::{WaypointResult, AgentError, AgentErrorKind};
///
/// fn might_fail() -> WaypointResult<()> {
///     Err(AgentError::new(AgentErrorKind::SqlExtraction))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Waypoint Error: {}", _0)]
pub struct WaypointError(Box<WaypointErrorKind>);

impl WaypointError {
    /// Create a new error from a kind.
    pub fn new(kind: WaypointErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WaypointErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to WaypointErrorKind
impl<T> From<T> for WaypointError
where
    T: Into<WaypointErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Waypoint operations.
pub type WaypointResult<T> = std::result::Result<T, WaypointError>;
