//! Error types for the Waypoint analytics pipeline.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use waypoint_error::{WaypointResult, SecurityError, SecurityErrorKind};
//!
//! fn gate(sql: &str) -> WaypointResult<()> {
//!     if sql.trim().is_empty() {
//!         Err(SecurityError::new(SecurityErrorKind::EmptyQuery))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(gate("   ").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod database;
mod error;
mod gateway;
mod security;

pub use agent::{AgentError, AgentErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{WaypointError, WaypointErrorKind, WaypointResult};
pub use gateway::{GatewayError, GatewayErrorKind, ProviderErrorKind};
pub use security::{SecurityError, SecurityErrorKind};
