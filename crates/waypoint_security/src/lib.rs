//! SQL security gate for the Waypoint analytics pipeline.
//!
//! This crate is the sole safety boundary between an LLM's free-text SQL and
//! a live database: a conservative keyword/shape validator, a sanitizer, and
//! an executor that caps statement runtime and never lets a raw database
//! fault escape. It also houses the per-caller rate limiter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod executor;
mod rate_limit;
mod validation;

pub use executor::{DEFAULT_STATEMENT_TIMEOUT_SECS, PgExecutor, QueryOutcome, Row, SafeExecutor};
pub use rate_limit::{Clock, RateLimiter, SystemClock};
pub use validation::{QueryValidator, sanitize_query};
