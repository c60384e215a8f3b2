//! Result validation against curated golden queries.
//!
//! A generated answer earns a trust score by re-running the closest golden
//! query and comparing both result sets and the SQL text itself. Validation
//! never fails the pipeline; faults degrade the score and leave a note.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use waypoint_database::{GoldenQuery, GoldenQueryRepository};
use waypoint_error::DatabaseError;
use waypoint_security::{Row, SafeExecutor};

/// Trust assigned when no golden query matches the question.
const NO_REFERENCE_TRUST: f64 = 0.6;

/// Trust assigned when validation itself faults.
const DEGRADED_TRUST: f64 = 0.5;

/// Minimum overlapping words between question and golden question.
const MATCH_THRESHOLD: usize = 3;

/// Absolute tolerance when comparing numeric cell values.
const NUMERIC_TOLERANCE: f64 = 0.01;

/// The outcome of validating one generated answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Composite trust in [0,1], rounded to two decimals
    pub trust_score: f64,
    /// Question text of the golden query used, when one matched
    pub matched_reference: Option<String>,
    /// Human-readable account of every comparison step
    pub notes: Vec<String>,
}

/// Scores generated answers against the golden query corpus.
pub struct ValidatorAgent {
    repo: Arc<dyn GoldenQueryRepository>,
    executor: Arc<dyn SafeExecutor>,
}

impl ValidatorAgent {
    /// Create a validator over the golden corpus and executor.
    pub fn new(repo: Arc<dyn GoldenQueryRepository>, executor: Arc<dyn SafeExecutor>) -> Self {
        Self { repo, executor }
    }

    /// Score a generated answer.
    ///
    /// Without a matching golden query the score is a flat 0.6; with one, it
    /// weighs result similarity at 0.7 and SQL text similarity at 0.3.
    #[instrument(skip(self, generated_sql, rows), fields(question_len = question.len()))]
    pub fn validate(&self, question: &str, generated_sql: &str, rows: &[Row]) -> ValidationReport {
        match self.validate_inner(question, generated_sql, rows) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Validation degraded");
                ValidationReport {
                    trust_score: DEGRADED_TRUST,
                    matched_reference: None,
                    notes: vec![format!("Validation error: {}", e.kind)],
                }
            }
        }
    }

    fn validate_inner(
        &self,
        question: &str,
        generated_sql: &str,
        rows: &[Row],
    ) -> Result<ValidationReport, DatabaseError> {
        let golden = match self.find_reference(question)? {
            Some(golden) => golden,
            None => {
                debug!("No golden query matched");
                return Ok(ValidationReport {
                    trust_score: NO_REFERENCE_TRUST,
                    matched_reference: None,
                    notes: vec!["No matching golden query found for comparison".to_string()],
                });
            }
        };

        let outcome = self.executor.execute(&golden.sql_query);
        if !outcome.success {
            let error = outcome
                .error
                .unwrap_or_else(|| "unknown execution failure".to_string());
            return Ok(ValidationReport {
                trust_score: DEGRADED_TRUST,
                matched_reference: Some(golden.question),
                notes: vec![format!("Could not execute golden query: {error}")],
            });
        }

        // Reference identification trails the comparison notes.
        let (row_similarity, mut notes) = compare_results(rows, &outcome.rows);

        let sql_sim = sql_similarity(generated_sql, &golden.sql_query);
        notes.push(format!("Golden query match: {}", golden.question));
        notes.push(format!("SQL similarity: {sql_sim:.2}"));

        let trust = row_similarity * 0.7 + sql_sim * 0.3;
        let trust_score = (trust * 100.0).round() / 100.0;

        debug!(trust_score, row_similarity, sql_sim, "Validation complete");

        Ok(ValidationReport {
            trust_score,
            matched_reference: Some(golden.question),
            notes,
        })
    }

    /// First active golden query whose question shares at least three words
    /// with the incoming question.
    fn find_reference(&self, question: &str) -> Result<Option<GoldenQuery>, DatabaseError> {
        let words = word_set(question);
        let golden = self
            .repo
            .active_queries()?
            .into_iter()
            .find(|g| word_set(&g.question).intersection(&words).count() >= MATCH_THRESHOLD);
        Ok(golden)
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Compare two result sets: 0.4 weight on row counts, 0.6 on first-row
/// cell similarity.
pub fn compare_results(generated: &[Row], golden: &[Row]) -> (f64, Vec<String>) {
    if generated.is_empty() && golden.is_empty() {
        return (1.0, vec!["Both queries returned empty results".to_string()]);
    }
    if generated.is_empty() || golden.is_empty() {
        return (0.3, vec!["One query returned empty results".to_string()]);
    }

    let mut notes = Vec::new();

    let count_score = if generated.len() == golden.len() {
        notes.push(format!("Row counts match: {}", generated.len()));
        1.0
    } else {
        notes.push(format!(
            "Row count mismatch: {} vs {}",
            generated.len(),
            golden.len()
        ));
        0.5
    };

    let first_row_score = compare_rows(&generated[0], &golden[0]);
    notes.push(format!("First row similarity: {first_row_score:.2}"));

    (count_score * 0.4 + first_row_score * 0.6, notes)
}

/// Fraction of shared non-null cell values between two rows, over the union
/// of their column names. Numeric cells match within an absolute tolerance
/// of 0.01; other cells match on textual equality.
pub fn compare_rows(a: &Row, b: &Row) -> f64 {
    let keys: HashSet<&String> = a.keys().chain(b.keys()).collect();
    if keys.is_empty() {
        return 1.0;
    }

    let matching = keys
        .iter()
        .filter(|key| match (a.get(**key), b.get(**key)) {
            (Some(left), Some(right)) if !left.is_null() && !right.is_null() => {
                values_match(left, right)
            }
            _ => false,
        })
        .count();

    matching as f64 / keys.len() as f64
}

fn values_match(a: &JsonValue, b: &JsonValue) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return (x - y).abs() < NUMERIC_TOLERANCE;
    }
    value_text(a) == value_text(b)
}

// PostgreSQL serializes NUMERIC columns as JSON strings, so numeric
// comparison has to see through string-typed digits.
fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Jaccard similarity over the word sets of two normalized SQL texts.
pub fn sql_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_sql(a);
    let b = normalize_sql(b);

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = words_a.intersection(&words_b).count();

    intersection as f64 / union as f64
}

fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .trim_end_matches(';')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waypoint_database::InMemoryGoldenQueryRepository;
    use waypoint_security::QueryOutcome;

    fn row(pairs: &[(&str, JsonValue)]) -> Row {
        let mut row = Row::new();
        for (key, value) in pairs {
            row.insert(key.to_string(), value.clone());
        }
        row
    }

    struct FixedExecutor {
        outcome: QueryOutcome,
    }

    impl SafeExecutor for FixedExecutor {
        fn execute_with_timeout(&self, _sql: &str, _timeout_seconds: u64) -> QueryOutcome {
            self.outcome.clone()
        }
    }

    fn golden(question: &str, sql: &str) -> GoldenQuery {
        GoldenQuery {
            id: 1,
            question: question.to_string(),
            sql_query: sql.to_string(),
            category: None,
            is_active: true,
        }
    }

    fn validator(queries: Vec<GoldenQuery>, outcome: QueryOutcome) -> ValidatorAgent {
        ValidatorAgent::new(
            Arc::new(InMemoryGoldenQueryRepository::new(queries)),
            Arc::new(FixedExecutor { outcome }),
        )
    }

    #[test]
    fn no_reference_scores_flat() {
        let agent = validator(vec![], QueryOutcome::ok(vec![]));
        let report = agent.validate("how many completed trips", "SELECT 1", &[]);
        assert_eq!(report.trust_score, 0.6);
        assert_eq!(report.matched_reference, None);
        assert_eq!(
            report.notes,
            vec!["No matching golden query found for comparison".to_string()]
        );
    }

    #[test]
    fn reference_needs_three_shared_words() {
        let agent = validator(
            vec![golden("how many trips yesterday", "SELECT 1")],
            QueryOutcome::ok(vec![]),
        );
        // Only two words overlap.
        let report = agent.validate("how many drivers", "SELECT 1", &[]);
        assert_eq!(report.matched_reference, None);
    }

    #[test]
    fn identical_results_and_sql_score_one() {
        let rows = vec![row(&[("total", json!(42))])];
        let sql = "SELECT COUNT(*) AS total FROM trips";
        let agent = validator(
            vec![golden("how many trips are there", sql)],
            QueryOutcome::ok(rows.clone()),
        );

        let report = agent.validate("how many trips are there", sql, &rows);
        assert_eq!(report.trust_score, 1.0);
        assert_eq!(
            report.matched_reference,
            Some("how many trips are there".to_string())
        );
        // Comparison notes come first; the reference and SQL similarity
        // notes close the list.
        let n = report.notes.len();
        assert!(report.notes[..n - 2]
            .iter()
            .all(|note| !note.starts_with("Golden query match:")));
        assert_eq!(
            report.notes[n - 2],
            "Golden query match: how many trips are there"
        );
        assert_eq!(report.notes[n - 1], "SQL similarity: 1.00");
    }

    #[test]
    fn golden_execution_failure_degrades() {
        let agent = validator(
            vec![golden("how many trips are there", "SELECT 1")],
            QueryOutcome::failed("relation \"trips\" does not exist"),
        );
        let report = agent.validate("how many trips are there", "SELECT 1", &[]);
        assert_eq!(report.trust_score, 0.5);
        assert_eq!(report.notes.len(), 1);
        assert!(report.notes[0].starts_with("Could not execute golden query:"));
        assert_eq!(
            report.matched_reference.as_deref(),
            Some("how many trips are there")
        );
    }

    #[test]
    fn empty_result_sets() {
        let (score, notes) = compare_results(&[], &[]);
        assert_eq!(score, 1.0);
        assert_eq!(notes, vec!["Both queries returned empty results".to_string()]);

        let (score, notes) = compare_results(&[row(&[("a", json!(1))])], &[]);
        assert_eq!(score, 0.3);
        assert_eq!(notes, vec!["One query returned empty results".to_string()]);
    }

    #[test]
    fn row_count_mismatch_weighs_in() {
        let a = vec![row(&[("n", json!(1))]), row(&[("n", json!(2))])];
        let b = vec![row(&[("n", json!(1))])];
        let (score, notes) = compare_results(&a, &b);
        // count 0.5 * 0.4 + first-row 1.0 * 0.6
        assert!((score - 0.8).abs() < 1e-9);
        assert!(notes.iter().any(|n| n == "Row count mismatch: 2 vs 1"));
    }

    #[test]
    fn numeric_cells_match_within_tolerance() {
        let a = row(&[("fare", json!(12.504))]);
        let b = row(&[("fare", json!("12.50"))]);
        assert_eq!(compare_rows(&a, &b), 1.0);

        let c = row(&[("fare", json!(12.52))]);
        assert_eq!(compare_rows(&a, &c), 0.0);

        // NUMERIC columns arrive as strings from row_to_json.
        let d = row(&[("x", json!("1.00"))]);
        let e = row(&[("x", json!("1.001"))]);
        let f = row(&[("x", json!("1.02"))]);
        assert_eq!(compare_rows(&d, &e), 1.0);
        assert_eq!(compare_rows(&d, &f), 0.0);
    }

    #[test]
    fn null_cells_never_match() {
        let a = row(&[("x", json!(null))]);
        let b = row(&[("x", json!(null))]);
        assert_eq!(compare_rows(&a, &b), 0.0);
    }

    #[test]
    fn disjoint_columns_score_zero() {
        let a = row(&[("a", json!(1))]);
        let b = row(&[("b", json!(1))]);
        assert_eq!(compare_rows(&a, &b), 0.0);
    }

    #[test]
    fn empty_rows_are_identical() {
        assert_eq!(compare_rows(&Row::new(), &Row::new()), 1.0);
    }

    #[test]
    fn sql_similarity_ignores_case_whitespace_and_semicolon() {
        let sim = sql_similarity(
            "select   count(*) from trips;",
            "SELECT COUNT(*)\nFROM trips",
        );
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn sql_similarity_partial_overlap() {
        let sim = sql_similarity("SELECT a FROM t", "SELECT b FROM t");
        // union {SELECT, A, B, FROM, T} = 5, intersection = 3
        assert!((sim - 0.6).abs() < 1e-9);
    }

    #[test]
    fn sql_similarity_no_shared_words() {
        assert_eq!(sql_similarity("SELECT a FROM t", "WITH x AS (y) TABLE z"), 0.0);
    }

    #[test]
    fn empty_sql_texts_are_identical() {
        assert_eq!(sql_similarity("", ""), 1.0);
    }
}
