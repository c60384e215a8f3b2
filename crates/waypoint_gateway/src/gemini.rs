//! Google Gemini REST driver.

use crate::{DriverReply, GenerationDriver};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_error::{GatewayError, ProviderErrorKind};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

/// Google Gemini API driver speaking the REST `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiDriver {
    /// Creates a new Gemini driver.
    ///
    /// Reads the API key from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not set.
    #[instrument(skip_all, fields(model = %model))]
    pub fn new(model: String) -> Result<Self, GatewayError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            GatewayError::provider(
                "gemini",
                ProviderErrorKind::MissingApiKey("GEMINI_API_KEY not set".to_string()),
            )
        })?;

        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a new Gemini driver with an explicit API key.
    pub fn with_api_key(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerationDriver for GeminiDriver {
    #[instrument(skip(self, req), fields(provider = "gemini", model = %self.model))]
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: &req.prompt }],
            }],
            system_instruction: req.system_prompt.as_deref().map(|text| Content {
                parts: vec![TextPart { text }],
            }),
            generation_config: GenerationConfig {
                temperature: req.temperature,
                max_output_tokens: req.max_tokens,
            },
        };

        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        debug!("Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(req.timeout_seconds))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                GatewayError::provider("gemini", ProviderErrorKind::Http(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, body = %message, "Gemini API returned error");
            let kind = if status.as_u16() == 429 {
                ProviderErrorKind::RateLimit
            } else {
                ProviderErrorKind::Api {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(GatewayError::provider("gemini", kind));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GatewayError::provider("gemini", ProviderErrorKind::ResponseParsing(e.to_string()))
        })?;

        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .filter_map(|c| c.parts)
            .flatten()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(GatewayError::provider(
                "gemini",
                ProviderErrorKind::ResponseParsing("response contained no text parts".to_string()),
            ));
        }

        Ok(DriverReply {
            text,
            model: self.model.clone(),
            tokens: parsed.usage_metadata.and_then(|u| u.total_token_count),
        })
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
