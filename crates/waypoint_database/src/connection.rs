//! Database connection utilities.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use waypoint_error::{DatabaseError, DatabaseErrorKind};

/// Connection pool shared across request tasks.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

fn database_url() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Establish a single connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection
/// string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub fn establish_connection() -> DatabaseResult<PgConnection> {
    let database_url = database_url()?;

    PgConnection::establish(&database_url)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}

/// Build an r2d2 connection pool from `DATABASE_URL`.
///
/// Each logical request checks out one connection for the duration of its SQL
/// work; the statement timeout is connection-scoped and the executor resets it
/// before the connection returns to the pool.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the pool cannot reach the
/// database.
pub fn establish_pool() -> DatabaseResult<DbPool> {
    let database_url = database_url()?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Pool(e.to_string())))
}
