//! Groq LPU inference driver using the OpenAI-compatible client.

use crate::openai_compat::OpenAiCompatibleClient;
use crate::{DriverReply, GenerationDriver};
use async_trait::async_trait;
use tracing::instrument;
use waypoint_core::{GenerateRequest, Provider};
use waypoint_error::{GatewayError, ProviderErrorKind};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq AI LPU Inference API driver.
#[derive(Debug, Clone)]
pub struct GroqDriver {
    inner: OpenAiCompatibleClient,
}

impl GroqDriver {
    /// Creates a new Groq driver.
    ///
    /// Reads the API key from the `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not set.
    #[instrument(skip_all, fields(model = %model))]
    pub fn new(model: String) -> Result<Self, GatewayError> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            GatewayError::provider(
                "groq",
                ProviderErrorKind::MissingApiKey("GROQ_API_KEY not set".to_string()),
            )
        })?;

        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a new Groq driver with an explicit API key.
    pub fn with_api_key(api_key: String, model: String) -> Self {
        let inner =
            OpenAiCompatibleClient::new(api_key, model, GROQ_API_URL.to_string(), "groq");
        Self { inner }
    }
}

#[async_trait]
impl GenerationDriver for GroqDriver {
    #[instrument(skip(self, req), fields(provider = "groq", model = %self.inner.model_name()))]
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        self.inner.generate(req).await
    }

    fn provider(&self) -> Provider {
        Provider::Groq
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
