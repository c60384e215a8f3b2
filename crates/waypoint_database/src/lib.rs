//! PostgreSQL integration for the Waypoint analytics pipeline.
//!
//! Provides the connection pool used by the safe query executor and the
//! golden-query repository the result validator reads from.
//!
//! # Example
//!
//! ```rust,ignore
//! use waypoint_database::{establish_pool, GoldenQueryRepository, PostgresGoldenQueryRepository};
//!
//! let pool = establish_pool()?;
//! let repo = PostgresGoldenQueryRepository::new(pool.clone());
//! let references = repo.active_queries()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod golden;

pub mod schema;

pub use connection::{DbPool, establish_connection, establish_pool};
pub use golden::{GoldenQuery, GoldenQueryRepository, InMemoryGoldenQueryRepository,
    PostgresGoldenQueryRepository};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, waypoint_error::DatabaseError>;
