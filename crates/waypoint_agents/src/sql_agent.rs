//! Text-to-SQL agent: generate, gate, execute.

use crate::context::ContextBuilder;
use crate::parse::parse_generation;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_gateway::Gateway;
use waypoint_security::{QueryValidator, Row, SafeExecutor};

const SQL_SYSTEM_PROMPT: &str = "You are a PostgreSQL analyst. Answer the user's question with exactly one \
SELECT statement.

Rules:
- Output a single PostgreSQL SELECT query inside a ```sql fenced block.
- Never write INSERT, UPDATE, DELETE, DROP, or any other mutating statement.
- After the query, add a line starting with 'Explanation:' describing what it returns.
- Finish with a line 'Confidence: High', 'Confidence: Medium', or 'Confidence: Low'.";

/// Everything the SQL agent learned about one question.
///
/// The agent never fails outright; upstream faults degrade into a response
/// with `error` set and `confidence_score` forced to zero where the result
/// cannot be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlAgentResponse {
    /// The generated SQL, present even when blocked by the security gate
    pub sql: Option<String>,
    /// Model-provided explanation of the query
    pub explanation: String,
    /// Parsed confidence in [0,1]; zeroed when no usable SQL was produced
    pub confidence_score: f32,
    /// Result rows; absent when the query never executed or failed
    pub rows: Option<Vec<Row>>,
    /// Number of result rows
    pub row_count: usize,
    /// Provider that answered, when generation succeeded
    pub provider: Option<String>,
    /// Model identifier, when generation succeeded
    pub model: Option<String>,
    /// Terminal error for this question, when any stage failed
    pub error: Option<String>,
}

impl SqlAgentResponse {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            sql: None,
            explanation: String::new(),
            confidence_score: 0.0,
            rows: None,
            row_count: 0,
            provider: None,
            model: None,
            error: Some(error.into()),
        }
    }
}

/// Generates a SQL answer for a natural-language question and executes it
/// behind the security gate.
pub struct SqlAgent {
    gateway: Arc<Gateway>,
    context: Arc<dyn ContextBuilder>,
    validator: QueryValidator,
    executor: Arc<dyn SafeExecutor>,
}

impl SqlAgent {
    /// Create an agent over shared gateway, schema context, and executor.
    pub fn new(
        gateway: Arc<Gateway>,
        context: Arc<dyn ContextBuilder>,
        executor: Arc<dyn SafeExecutor>,
    ) -> Self {
        Self {
            gateway,
            context,
            validator: QueryValidator::new(),
            executor,
        }
    }

    /// Answer a question: build context, generate SQL, validate it, and
    /// execute it. Each stage degrades into the response instead of erroring.
    ///
    /// `provider` pins the first backend the gateway tries; fallback still
    /// applies when it fails.
    #[instrument(skip(self), fields(question_len = question.len(), ?provider))]
    pub async fn answer(&self, question: &str, provider: Option<Provider>) -> SqlAgentResponse {
        let schema_context = match self.context.build_context(question).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Context construction failed");
                return SqlAgentResponse::failed(format!("Context construction failed: {e}"));
            }
        };

        let request = GenerateRequest {
            prompt: format!("{schema_context}\n\nQuestion: {question}"),
            system_prompt: Some(SQL_SYSTEM_PROMPT.to_string()),
            temperature: 0.3,
            max_tokens: 1000,
            timeout_seconds: 30,
            provider,
        };

        let generation = match self.gateway.generate(&request).await {
            Ok(g) => g,
            Err(e) => {
                warn!(error = %e, "Generation failed");
                return SqlAgentResponse::failed(format!("Generation failed: {}", e.kind));
            }
        };

        let parsed = parse_generation(generation.text());
        let provider = Some(generation.provider().to_string());
        let model = Some(generation.model().clone());

        let Some(sql) = parsed.sql else {
            warn!("No SQL statement found in model response");
            return SqlAgentResponse {
                provider,
                model,
                explanation: parsed.explanation,
                ..SqlAgentResponse::failed("No SQL statement found in model response")
            };
        };

        if let Err(e) = self.validator.validate(&sql) {
            warn!(reason = %e.reason(), "Generated SQL rejected by security gate");
            return SqlAgentResponse {
                sql: Some(sql),
                explanation: parsed.explanation,
                confidence_score: 0.0,
                rows: None,
                row_count: 0,
                provider,
                model,
                error: Some(format!("Security validation failed: {}", e.reason())),
            };
        }

        debug!(sql = %sql, "Executing generated SQL");
        let outcome = self.executor.execute(&sql);

        if !outcome.success {
            let message = outcome
                .error
                .unwrap_or_else(|| "Query execution failed".to_string());
            warn!(error = %message, "Generated SQL failed to execute");
            return SqlAgentResponse {
                sql: Some(sql),
                explanation: parsed.explanation,
                confidence_score: parsed.confidence,
                rows: None,
                row_count: 0,
                provider,
                model,
                error: Some(message),
            };
        }

        info!(
            rows = outcome.rows.len(),
            confidence = parsed.confidence,
            "SQL agent answered"
        );

        SqlAgentResponse {
            sql: Some(sql),
            explanation: parsed.explanation,
            confidence_score: parsed.confidence,
            row_count: outcome.rows.len(),
            rows: Some(outcome.rows),
            provider,
            model,
            error: None,
        }
    }
}
