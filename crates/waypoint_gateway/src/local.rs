//! Deterministic local stub driver.

use crate::{DriverReply, GenerationDriver};
use async_trait::async_trait;
use tracing::{debug, instrument};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_error::GatewayError;

const LOCAL_MODEL_NAME: &str = "local-stub";

/// Stub driver producing canned responses without a network call.
///
/// Sits last in the fallback chain so the pipeline degrades to something
/// deterministic when every remote provider is down; also serves as the
/// development and test backend.
#[derive(Debug, Clone, Default)]
pub struct LocalDriver;

impl LocalDriver {
    /// Creates a new local stub driver.
    pub fn new() -> Self {
        Self
    }

    fn canned_response(prompt: &str) -> String {
        let lowered = prompt.to_lowercase();
        if lowered.contains("sql") || lowered.contains("query") {
            return "```sql\nSELECT COUNT(*) AS total_count\nFROM trips\nWHERE status = 'completed';\n```\n\nExplanation: Counts all completed trips.\n\nConfidence: Low"
                .to_string();
        }

        "I am a local model stub and cannot answer this without a remote provider.".to_string()
    }
}

#[async_trait]
impl GenerationDriver for LocalDriver {
    #[instrument(skip(self, req), fields(provider = "local"))]
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        debug!("Serving canned local response");
        let text = Self::canned_response(&req.prompt);
        let tokens = text.split_whitespace().count() as u64;

        Ok(DriverReply {
            text,
            model: LOCAL_MODEL_NAME.to_string(),
            tokens: Some(tokens),
        })
    }

    fn provider(&self) -> Provider {
        Provider::Local
    }

    fn model_name(&self) -> &str {
        LOCAL_MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sql_prompts_get_a_fenced_select() {
        let driver = LocalDriver::new();
        let req = GenerateRequest::builder()
            .prompt("Generate the SQL query now.")
            .build()
            .unwrap();

        let reply = driver.generate(&req).await.unwrap();
        assert!(reply.text.contains("```sql"));
        assert!(reply.text.contains("SELECT"));
        assert_eq!(reply.model, "local-stub");
    }

    #[tokio::test]
    async fn other_prompts_get_the_fallback_sentence() {
        let driver = LocalDriver::new();
        let req = GenerateRequest::builder()
            .prompt("What does USNC mean?")
            .build()
            .unwrap();

        let reply = driver.generate(&req).await.unwrap();
        assert!(!reply.text.contains("SELECT"));
    }
}
