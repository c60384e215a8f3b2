//! Knowledge-context seam.
//!
//! Building the metadata context (table lists, column descriptions, business
//! terms such as `USNC = US and Canada`, usage rules) is an external
//! collaborator's job; the agents only concatenate the resulting text into
//! their prompts.

use async_trait::async_trait;
use waypoint_error::WaypointResult;

/// Produces the opaque context string the SQL and documentation agents embed
/// in their prompts.
#[async_trait]
pub trait ContextBuilder: Send + Sync {
    /// Build context for one question.
    async fn build_context(&self, question: &str) -> WaypointResult<String>;
}

/// Context builder returning one fixed string, for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticContextBuilder {
    context: String,
}

impl StaticContextBuilder {
    /// Create a builder that always yields `context`.
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}

#[async_trait]
impl ContextBuilder for StaticContextBuilder {
    async fn build_context(&self, _question: &str) -> WaypointResult<String> {
        Ok(self.context.clone())
    }
}
