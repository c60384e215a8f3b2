//! Static validation and sanitization of generated SQL.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};
use waypoint_error::{SecurityError, SecurityErrorKind};

/// Destructive keywords rejected as whole words, plus statement-separator
/// smuggling shapes. Checked case-insensitively.
const BLOCKED_PATTERNS: &[&str] = &[
    r"\bDROP\b",
    r"\bDELETE\b",
    r"\bTRUNCATE\b",
    r"\bUPDATE\b",
    r"\bINSERT\b",
    r"\bALTER\b",
    r"\bCREATE\b",
    r"\bGRANT\b",
    r"\bREVOKE\b",
    r"\bEXEC\b",
    r"\bEXECUTE\b",
    r";.*DROP",
    r";.*DELETE",
    r";.*UPDATE",
];

fn blocked_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        BLOCKED_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?is){p}")).expect("blocklist pattern is valid"))
            .collect()
    })
}

fn select_prefix() -> &'static Regex {
    static SELECT: OnceLock<Regex> = OnceLock::new();
    SELECT.get_or_init(|| Regex::new(r"(?i)^\s*SELECT\b").expect("prefix pattern is valid"))
}

/// Validates SQL statements before they may reach the database.
///
/// The policy is a blocklist, not an allowlist of statement shapes: anything
/// containing a destructive keyword, stacked statements, or a non-SELECT head
/// is rejected outright.
///
/// # Examples
///
/// ```
/// use waypoint_security::QueryValidator;
///
/// let validator = QueryValidator::new();
/// assert!(validator.validate("SELECT id FROM trips").is_ok());
/// assert!(validator.validate("Drop TABLE trips").is_err());
/// assert!(validator.validate("").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValidator;

impl QueryValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a SQL statement against the security policy.
    ///
    /// # Errors
    ///
    /// Returns a [`SecurityError`] naming the first violated rule.
    #[instrument(skip(self, sql), fields(sql_len = sql.len()))]
    pub fn validate(&self, sql: &str) -> Result<(), SecurityError> {
        if sql.trim().is_empty() {
            return Err(SecurityError::new(SecurityErrorKind::EmptyQuery));
        }

        for pattern in blocked_patterns() {
            if let Some(found) = pattern.find(sql) {
                warn!(matched = found.as_str(), "Blocked keyword in generated SQL");
                return Err(SecurityError::new(SecurityErrorKind::BlockedKeyword(
                    found.as_str().to_uppercase(),
                )));
            }
        }

        if sql.matches(';').count() > 1 {
            return Err(SecurityError::new(SecurityErrorKind::MultipleStatements));
        }

        if !select_prefix().is_match(sql) {
            return Err(SecurityError::new(SecurityErrorKind::NotSelect));
        }

        // Comments are allowed, but a pile of them is the classic smuggling shape.
        if sql.matches("--").count() > 2 {
            return Err(SecurityError::new(SecurityErrorKind::SuspiciousComments));
        }

        debug!("SQL passed security validation");
        Ok(())
    }
}

/// Sanitize a validated statement before execution: strip one trailing
/// statement separator and collapse whitespace runs to single spaces.
///
/// # Examples
///
/// ```
/// use waypoint_security::sanitize_query;
///
/// let sql = "SELECT id\n  FROM trips\t WHERE status = 'completed';";
/// assert_eq!(
///     sanitize_query(sql),
///     "SELECT id FROM trips WHERE status = 'completed'"
/// );
/// ```
pub fn sanitize_query(sql: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("pattern is valid"));

    let trimmed = sql.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    whitespace.replace_all(trimmed, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_error::SecurityErrorKind;

    fn validate(sql: &str) -> Result<(), SecurityError> {
        QueryValidator::new().validate(sql)
    }

    #[test]
    fn accepts_plain_select() {
        assert!(validate("SELECT id, status FROM trips WHERE status = 'completed'").is_ok());
    }

    #[test]
    fn accepts_select_with_joins_and_limit() {
        assert!(
            validate(
                "SELECT r.name, SUM(t.fare) AS revenue \
                 FROM trips t JOIN regions r ON r.id = t.region_id \
                 GROUP BY r.name ORDER BY revenue DESC LIMIT 5;"
            )
            .is_ok()
        );
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        for sql in ["", "   ", "\n\t"] {
            let err = validate(sql).unwrap_err();
            assert_eq!(err.kind, SecurityErrorKind::EmptyQuery);
            assert_eq!(err.reason(), "Empty query");
        }
    }

    #[test]
    fn rejects_blocked_keywords_any_case() {
        for sql in [
            "DROP TABLE trips",
            "Drop TABLE trips",
            "SELECT 1; drop table trips",
            "delete from trips",
            "SELECT * FROM trips WHERE id = 1 OR (SELECT 1 FROM users); UPDATE users SET x = 1",
            "truncate trips",
            "INSERT INTO trips VALUES (1)",
            "alter table trips add column x int",
            "create table x (id int)",
            "grant all on trips to public",
            "revoke all on trips from public",
            "exec sp_help",
            "EXECUTE something",
        ] {
            let err = validate(sql).unwrap_err();
            assert!(
                matches!(err.kind, SecurityErrorKind::BlockedKeyword(_)),
                "expected keyword rejection for {sql:?}, got {:?}",
                err.kind
            );
        }
    }

    #[test]
    fn keyword_must_be_whole_word() {
        // "updated_at" contains "update" but not as a whole word.
        assert!(validate("SELECT updated_at FROM trips").is_ok());
        assert!(validate("SELECT delivery_dropoff FROM trips").is_ok());
    }

    #[test]
    fn rejects_stacked_statements() {
        let err = validate("SELECT 1; SELECT 2;").unwrap_err();
        assert_eq!(err.kind, SecurityErrorKind::MultipleStatements);
    }

    #[test]
    fn single_trailing_separator_is_fine() {
        assert!(validate("SELECT 1;").is_ok());
    }

    #[test]
    fn rejects_non_select_head() {
        let err = validate("WITH x AS (SELECT 1) SELECT * FROM x").unwrap_err();
        assert_eq!(err.kind, SecurityErrorKind::NotSelect);

        let err = validate("EXPLAIN SELECT 1").unwrap_err();
        assert_eq!(err.kind, SecurityErrorKind::NotSelect);
    }

    #[test]
    fn leading_whitespace_before_select_is_fine() {
        assert!(validate("   \n SELECT 1").is_ok());
    }

    #[test]
    fn rejects_comment_piles() {
        let err = validate("SELECT 1 -- a\n-- b\n-- c\nFROM trips").unwrap_err();
        assert_eq!(err.kind, SecurityErrorKind::SuspiciousComments);

        // Up to two comment markers pass.
        assert!(validate("SELECT 1 -- note\nFROM trips -- note").is_ok());
    }

    #[test]
    fn sanitize_collapses_whitespace_and_strips_separator() {
        assert_eq!(sanitize_query("SELECT   1  ;"), "SELECT 1");
        assert_eq!(sanitize_query("SELECT\n1\nFROM\ttrips"), "SELECT 1 FROM trips");
        // Only one trailing separator is stripped.
        assert_eq!(sanitize_query("SELECT 1;;"), "SELECT 1;");
    }
}
