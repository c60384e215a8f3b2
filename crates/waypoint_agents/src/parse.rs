//! Parsing of semi-structured model responses into SQL, explanation, and
//! confidence.
//!
//! The generation backends are not guaranteed to emit structured output, so
//! this stays a heuristic string parser; it is pure and independently tested
//! here rather than embedded in the agent orchestration.

use regex::Regex;
use std::sync::OnceLock;

/// Confidence assigned when the response carries no recognizable marker.
const DEFAULT_CONFIDENCE: f32 = 0.7;

/// Explanation used when the response carries no `Explanation:` section.
const DEFAULT_EXPLANATION: &str = "No explanation provided";

/// The three fields recovered from one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGeneration {
    /// The extracted SQL statement, absent when no strategy matched
    pub sql: Option<String>,
    /// Explanation text, defaulted when absent
    pub explanation: String,
    /// Self-reported confidence mapped to [0,1]
    pub confidence: f32,
}

/// Parse a full model response.
pub fn parse_generation(response: &str) -> ParsedGeneration {
    ParsedGeneration {
        sql: extract_sql(response),
        explanation: extract_explanation(response),
        confidence: extract_confidence(response),
    }
}

fn fenced_sql() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?si)```sql\s*\n(.*?)\n```").expect("pattern is valid"))
}

fn fenced_select() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?si)```\n(SELECT.*?)\n```").expect("pattern is valid"))
}

/// Extract a SQL statement, trying strategies in order of preference:
/// a fenced block tagged `sql`, any fenced block starting with SELECT, then
/// a line scan from the first SELECT to the first line ending in `;`.
pub fn extract_sql(response: &str) -> Option<String> {
    if let Some(captures) = fenced_sql().captures(response) {
        return Some(captures[1].trim().to_string());
    }

    if let Some(captures) = fenced_select().captures(response) {
        return Some(captures[1].trim().to_string());
    }

    if response.to_uppercase().contains("SELECT") {
        let mut sql_lines = Vec::new();
        let mut in_sql = false;

        for line in response.lines() {
            if line.to_uppercase().contains("SELECT") {
                in_sql = true;
            }
            if in_sql {
                sql_lines.push(line);
                if line.trim_end().ends_with(';') {
                    break;
                }
            }
        }

        if !sql_lines.is_empty() {
            return Some(sql_lines.join("\n").trim().to_string());
        }
    }

    None
}

/// Extract the text following an `Explanation:` marker, up to a blank line or
/// a `Confidence:` marker.
pub fn extract_explanation(response: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?si)Explanation:\s*(.+?)(?:\n\n|Confidence:|$)").expect("pattern is valid")
    });

    re.captures(response)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string())
}

/// Map the response's stated confidence to a score.
///
/// High → 0.9, Medium → 0.7, Low → 0.4, no marker → 0.7. The table is fixed;
/// downstream expectations depend on these exact constants.
pub fn extract_confidence(response: &str) -> f32 {
    let lowered = response.to_lowercase();
    if lowered.contains("confidence: high") {
        0.9
    } else if lowered.contains("confidence: medium") {
        0.7
    } else if lowered.contains("confidence: low") {
        0.4
    } else {
        DEFAULT_CONFIDENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "Here is the query:\n\n```sql\nSELECT d.name, SUM(t.fare) AS earnings\nFROM trips t\nJOIN drivers d ON d.id = t.driver_id\nGROUP BY d.name\nORDER BY earnings DESC\nLIMIT 5;\n```\n\nExplanation: Ranks drivers by their summed fares.\n\nConfidence: High";

    #[test]
    fn extracts_from_tagged_fence() {
        let sql = extract_sql(FULL_RESPONSE).unwrap();
        assert!(sql.starts_with("SELECT d.name"));
        assert!(sql.ends_with("LIMIT 5;"));
    }

    #[test]
    fn extracts_from_untagged_fence() {
        let response = "```\nSELECT COUNT(*) FROM trips\n```";
        assert_eq!(
            extract_sql(response).unwrap(),
            "SELECT COUNT(*) FROM trips"
        );
    }

    #[test]
    fn tagged_fence_wins_over_untagged() {
        let response =
            "```\nSELECT 1\n```\n```sql\nSELECT 2\n```";
        assert_eq!(extract_sql(response).unwrap(), "SELECT 2");
    }

    #[test]
    fn heuristic_scan_stops_at_semicolon() {
        let response = "The query you want is\nSELECT id\nFROM trips\nWHERE status = 'completed';\nHope that helps.";
        let sql = extract_sql(response).unwrap();
        assert!(sql.starts_with("SELECT id"));
        assert!(sql.ends_with("'completed';"));
        assert!(!sql.contains("Hope"));
    }

    #[test]
    fn no_select_means_no_sql() {
        assert_eq!(extract_sql("I cannot answer that."), None);
        assert_eq!(extract_sql(""), None);
    }

    #[test]
    fn explanation_stops_at_confidence_marker() {
        assert_eq!(
            extract_explanation(FULL_RESPONSE),
            "Ranks drivers by their summed fares."
        );
    }

    #[test]
    fn explanation_defaults_when_absent() {
        assert_eq!(
            extract_explanation("```sql\nSELECT 1\n```"),
            "No explanation provided"
        );
    }

    #[test]
    fn confidence_mapping_table() {
        assert_eq!(extract_confidence("Confidence: High"), 0.9);
        assert_eq!(extract_confidence("confidence: HIGH"), 0.9);
        assert_eq!(extract_confidence("Confidence: Medium"), 0.7);
        assert_eq!(extract_confidence("Confidence: low"), 0.4);
        assert_eq!(extract_confidence("no marker here"), 0.7);
    }

    #[test]
    fn full_parse_combines_fields() {
        let parsed = parse_generation(FULL_RESPONSE);
        assert!(parsed.sql.is_some());
        assert_eq!(parsed.confidence, 0.9);
        assert_eq!(parsed.explanation, "Ranks drivers by their summed fares.");
    }
}
