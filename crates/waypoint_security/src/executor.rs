//! Safe execution of validated SQL with a statement timeout.

use crate::sanitize_query;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use tracing::{debug, error, instrument};
use waypoint_database::DbPool;
use waypoint_error::{DatabaseError, DatabaseErrorKind};

/// Default server-side statement timeout, in seconds.
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 5;

/// One result row as an ordered column→value mapping.
///
/// `serde_json` is built with `preserve_order`, so iteration follows the
/// column order of the SELECT list.
pub type Row = serde_json::Map<String, JsonValue>;

/// Outcome of a safe execution attempt.
///
/// Rows are populated only on success; failures carry the store's error
/// message instead of propagating a raw fault.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOutcome {
    /// Whether the statement executed and materialized cleanly
    pub success: bool,
    /// Result rows in SELECT-list column order
    pub rows: Vec<Row>,
    /// Error message when success is false
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Successful outcome carrying the materialized rows.
    pub fn ok(rows: Vec<Row>) -> Self {
        Self {
            success: true,
            rows,
            error: None,
        }
    }

    /// Failed outcome carrying the store's error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Executes already-validated SQL under a statement timeout.
///
/// This is a trait seam so the agents can be exercised against a fake store
/// in tests; [`PgExecutor`] is the production implementation.
pub trait SafeExecutor: Send + Sync {
    /// Execute with an explicit timeout in seconds.
    fn execute_with_timeout(&self, sql: &str, timeout_seconds: u64) -> QueryOutcome;

    /// Execute with the default statement timeout.
    fn execute(&self, sql: &str) -> QueryOutcome {
        self.execute_with_timeout(sql, DEFAULT_STATEMENT_TIMEOUT_SECS)
    }
}

/// PostgreSQL executor over the shared connection pool.
///
/// Each call checks out one connection, sets a connection-scoped
/// `statement_timeout`, materializes all rows, and resets the timeout on
/// every exit path so the setting never leaks back into the pool.
#[derive(Clone)]
pub struct PgExecutor {
    pool: DbPool,
}

impl PgExecutor {
    /// Create an executor over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn run(
        conn: &mut PgConnection,
        sql: &str,
        timeout_seconds: u64,
    ) -> Result<Vec<Row>, DatabaseError> {
        diesel::sql_query(format!("SET statement_timeout = '{timeout_seconds}s'"))
            .execute(conn)?;

        // The reset must run whether or not the statement failed, so the
        // fetch result is held until the timeout is back to default.
        let fetched = Self::fetch_rows(conn, sql);
        let reset = diesel::sql_query("RESET statement_timeout").execute(conn);

        let rows = fetched?;
        reset?;
        Ok(rows)
    }

    fn fetch_rows(conn: &mut PgConnection, sql: &str) -> Result<Vec<Row>, DatabaseError> {
        #[derive(QueryableByName)]
        struct JsonRow {
            #[diesel(sql_type = diesel::sql_types::Json)]
            json: JsonValue,
        }

        // Wrap the statement so PostgreSQL serializes each row with its
        // column order intact.
        let json_query = format!("SELECT row_to_json(t) AS json FROM ({sql}) t");

        let rows = diesel::sql_query(&json_query).load::<JsonRow>(conn)?;

        rows.into_iter()
            .map(|row| match row.json {
                JsonValue::Object(map) => Ok(map),
                other => Err(DatabaseError::new(DatabaseErrorKind::Serialization(
                    format!("expected JSON object row, got {other}"),
                ))),
            })
            .collect()
    }
}

impl SafeExecutor for PgExecutor {
    #[instrument(skip(self, sql), fields(sql_len = sql.len(), timeout_seconds))]
    fn execute_with_timeout(&self, sql: &str, timeout_seconds: u64) -> QueryOutcome {
        let sql = sanitize_query(sql);

        let mut conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %e, "Could not check out a database connection");
                return QueryOutcome::failed(e.to_string());
            }
        };

        match Self::run(&mut conn, &sql, timeout_seconds) {
            Ok(rows) => {
                debug!(count = rows.len(), "Query executed");
                QueryOutcome::ok(rows)
            }
            Err(e) => {
                error!(error = %e, "Query execution failed");
                QueryOutcome::failed(e.kind.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_constructors() {
        let mut row = Row::new();
        row.insert("total".to_string(), json!(42));

        let ok = QueryOutcome::ok(vec![row]);
        assert!(ok.success);
        assert_eq!(ok.rows.len(), 1);
        assert!(ok.error.is_none());

        let failed = QueryOutcome::failed("relation \"tripz\" does not exist");
        assert!(!failed.success);
        assert!(failed.rows.is_empty());
        assert!(failed.error.unwrap().contains("tripz"));
    }
}
