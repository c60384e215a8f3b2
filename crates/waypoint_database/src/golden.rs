//! Golden-query storage.

use crate::connection::DbPool;
use crate::{DatabaseResult, schema::golden_queries};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use waypoint_error::{DatabaseError, DatabaseErrorKind};

/// A human-vetted (question, SQL) pair used as ground truth during result
/// validation. Read-only from the pipeline's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = golden_queries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GoldenQuery {
    /// Surrogate key
    pub id: i32,
    /// Reference question text
    pub question: String,
    /// Trusted SQL for that question
    pub sql_query: String,
    /// Grouping label
    pub category: Option<String>,
    /// Whether the validator should consider this entry
    pub is_active: bool,
}

/// Read access to the golden-query corpus.
///
/// The validator agent depends on this trait so tests can swap in an
/// in-memory corpus without a database.
pub trait GoldenQueryRepository: Send + Sync {
    /// All active golden queries, in storage order.
    fn active_queries(&self) -> DatabaseResult<Vec<GoldenQuery>>;
}

/// PostgreSQL implementation of [`GoldenQueryRepository`].
#[derive(Clone)]
pub struct PostgresGoldenQueryRepository {
    pool: DbPool,
}

impl PostgresGoldenQueryRepository {
    /// Create a repository backed by the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl GoldenQueryRepository for PostgresGoldenQueryRepository {
    #[instrument(skip(self))]
    fn active_queries(&self) -> DatabaseResult<Vec<GoldenQuery>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Pool(e.to_string())))?;

        let queries = golden_queries::table
            .filter(golden_queries::is_active.eq(true))
            .order(golden_queries::id.asc())
            .select(GoldenQuery::as_select())
            .load(&mut conn)?;

        debug!(count = queries.len(), "Loaded active golden queries");
        Ok(queries)
    }
}

/// In-memory implementation of [`GoldenQueryRepository`] for tests and
/// single-process deployments without a curated corpus.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGoldenQueryRepository {
    queries: Vec<GoldenQuery>,
}

impl InMemoryGoldenQueryRepository {
    /// Create a repository over a fixed set of entries.
    pub fn new(queries: Vec<GoldenQuery>) -> Self {
        Self { queries }
    }
}

impl GoldenQueryRepository for InMemoryGoldenQueryRepository {
    fn active_queries(&self) -> DatabaseResult<Vec<GoldenQuery>> {
        Ok(self
            .queries
            .iter()
            .filter(|q| q.is_active)
            .cloned()
            .collect())
    }
}
