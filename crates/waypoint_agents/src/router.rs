//! Intent routing between the SQL and documentation agents.

use crate::{DocAgent, DocResponse, SqlAgent, SqlAgentResponse};
use serde::Serialize;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, instrument, warn};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_gateway::Gateway;

const ROUTER_SYSTEM_PROMPT: &str = "You are an intent classifier for an analytics assistant. Decide whether \
the user's question asks for data (numbers, counts, rankings, trends over \
records) or for documentation (definitions, explanations of terms and \
concepts).

Respond with exactly one word: SQL_QUERY or DOCUMENTATION.";

/// The two question intents the pipeline distinguishes.
///
/// Classification failures resolve to [`Intent::DataQuery`]; a wrongly-routed
/// data question degrades worse than a wrongly-routed definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    /// The question wants rows or aggregates from the store
    DataQuery,
    /// The question wants a definition or explanation
    Documentation,
}

/// Which agent produced a routed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
pub enum AgentKind {
    /// The text-to-SQL agent
    #[strum(serialize = "sql_agent")]
    #[serde(rename = "sql_agent")]
    Sql,
    /// The documentation agent
    #[strum(serialize = "doc_agent")]
    #[serde(rename = "doc_agent")]
    Doc,
}

/// The answering agent's response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentResponse {
    /// Response from the SQL agent
    Sql(SqlAgentResponse),
    /// Response from the documentation agent
    Doc(DocResponse),
}

/// A routed answer tagged with the agent that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedResponse {
    /// Which agent answered
    pub agent: AgentKind,
    /// The agent's response
    pub response: AgentResponse,
}

/// Classifies each question and dispatches it to the matching agent.
pub struct IntentRouter {
    gateway: Arc<Gateway>,
    sql_agent: SqlAgent,
    doc_agent: DocAgent,
}

impl IntentRouter {
    /// Create a router over the shared gateway and both agents.
    pub fn new(gateway: Arc<Gateway>, sql_agent: SqlAgent, doc_agent: DocAgent) -> Self {
        Self {
            gateway,
            sql_agent,
            doc_agent,
        }
    }

    /// Classify a question's intent.
    ///
    /// Unrecognized classifier output and gateway failures both resolve to
    /// [`Intent::DataQuery`].
    #[instrument(skip(self), fields(question_len = question.len()))]
    pub async fn classify(&self, question: &str) -> Intent {
        let request = GenerateRequest {
            prompt: question.to_string(),
            system_prompt: Some(ROUTER_SYSTEM_PROMPT.to_string()),
            temperature: 0.3,
            max_tokens: 50,
            timeout_seconds: 30,
            provider: None,
        };

        match self.gateway.generate(&request).await {
            Ok(generation) => {
                let label = generation.text().to_uppercase();
                let intent = if label.contains("SQL_QUERY") || label.contains("SQL") {
                    Intent::DataQuery
                } else if label.contains("DOCUMENTATION") || label.contains("DOC") {
                    Intent::Documentation
                } else {
                    debug!(label = %generation.text(), "Unrecognized intent label");
                    Intent::DataQuery
                };
                debug!(?intent, "Question classified");
                intent
            }
            Err(e) => {
                warn!(error = %e, "Intent classification failed, defaulting to data query");
                Intent::DataQuery
            }
        }
    }

    /// Classify and dispatch a question to the matching agent.
    ///
    /// `provider` pins the answering agent's first backend; classification
    /// always uses the gateway's default chain.
    pub async fn route(&self, question: &str, provider: Option<Provider>) -> RoutedResponse {
        match self.classify(question).await {
            Intent::DataQuery => RoutedResponse {
                agent: AgentKind::Sql,
                response: AgentResponse::Sql(self.sql_agent.answer(question, provider).await),
            },
            Intent::Documentation => RoutedResponse {
                agent: AgentKind::Doc,
                response: AgentResponse::Doc(self.doc_agent.answer(question, provider).await),
            },
        }
    }
}
