//! Documentation agent for definitional and conceptual questions.

use crate::context::ContextBuilder;
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_gateway::Gateway;

const DOC_SYSTEM_PROMPT: &str = "You are a helpful assistant explaining an analytics platform.

Answer the user's question based on the provided context.

Rules:
- Provide clear, concise explanations
- Reference specific tables or metrics when relevant
- Do NOT generate SQL queries
- If you do not have enough information, say so

Keep your answer brief and informative.";

/// A documentation answer, or the failure that prevented one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocResponse {
    /// Prose answer, absent on failure
    pub answer: Option<String>,
    /// Failure description, absent on success
    pub error: Option<String>,
}

/// Answers definitional questions with free-form prose instead of SQL.
///
/// Grounds each answer in the same documentation context (business terms,
/// metric definitions, table descriptions) the SQL agent embeds.
pub struct DocAgent {
    gateway: Arc<Gateway>,
    context: Arc<dyn ContextBuilder>,
}

impl DocAgent {
    /// Create an agent over the shared gateway and documentation context.
    pub fn new(gateway: Arc<Gateway>, context: Arc<dyn ContextBuilder>) -> Self {
        Self { gateway, context }
    }

    /// Answer a question. Context and gateway failures degrade into the
    /// response.
    #[instrument(skip(self), fields(question_len = question.len(), ?provider))]
    pub async fn answer(&self, question: &str, provider: Option<Provider>) -> DocResponse {
        let doc_context = match self.context.build_context(question).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Context construction failed");
                return DocResponse {
                    answer: None,
                    error: Some(format!("Context construction failed: {e}")),
                };
            }
        };

        let request = GenerateRequest {
            prompt: format!("{doc_context}\n\nUser Question: {question}\n\nProvide a helpful answer:"),
            system_prompt: Some(DOC_SYSTEM_PROMPT.to_string()),
            temperature: 0.7,
            max_tokens: 500,
            timeout_seconds: 30,
            provider,
        };

        match self.gateway.generate(&request).await {
            Ok(generation) => DocResponse {
                answer: Some(generation.text().clone()),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Documentation generation failed");
                DocResponse {
                    answer: None,
                    error: Some(format!("Generation failed: {}", e.kind)),
                }
            }
        }
    }
}
