//! OpenAI chat-completions driver.

use crate::openai_compat::OpenAiCompatibleClient;
use crate::{DriverReply, GenerationDriver};
use async_trait::async_trait;
use tracing::instrument;
use waypoint_core::{GenerateRequest, Provider};
use waypoint_error::{GatewayError, ProviderErrorKind};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API driver.
#[derive(Debug, Clone)]
pub struct OpenAiDriver {
    inner: OpenAiCompatibleClient,
}

impl OpenAiDriver {
    /// Creates a new OpenAI driver.
    ///
    /// Reads the API key from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not set.
    #[instrument(skip_all, fields(model = %model))]
    pub fn new(model: String) -> Result<Self, GatewayError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            GatewayError::provider(
                "openai",
                ProviderErrorKind::MissingApiKey("OPENAI_API_KEY not set".to_string()),
            )
        })?;

        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a new OpenAI driver with an explicit API key.
    pub fn with_api_key(api_key: String, model: String) -> Self {
        let inner = OpenAiCompatibleClient::new(
            api_key,
            model,
            OPENAI_API_URL.to_string(),
            "openai",
        );
        Self { inner }
    }
}

#[async_trait]
impl GenerationDriver for OpenAiDriver {
    #[instrument(skip(self, req), fields(provider = "openai", model = %self.inner.model_name()))]
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        self.inner.generate(req).await
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
