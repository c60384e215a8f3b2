//! Shared client for OpenAI-compatible chat-completions APIs.

use crate::DriverReply;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use waypoint_core::GenerateRequest;
use waypoint_error::{GatewayError, ProviderErrorKind};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

/// HTTP client for any provider speaking the OpenAI chat-completions dialect.
///
/// Both the OpenAI and Groq drivers delegate to this client and contribute
/// only their endpoint, credentials, and provider tag.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    provider_name: &'static str,
}

impl OpenAiCompatibleClient {
    /// Create a client for one provider endpoint.
    pub fn new(
        api_key: String,
        model: String,
        endpoint: String,
        provider_name: &'static str,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint,
            provider_name,
        }
    }

    /// Model identifier this client targets.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Provider tag used in error reporting.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    /// Send one chat-completions request.
    pub async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &req.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &req.prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };

        debug!(provider = self.provider_name, model = %self.model, "Sending chat-completions request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(req.timeout_seconds))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.provider_name, error = %e, "Request failed");
                GatewayError::provider(
                    self.provider_name,
                    ProviderErrorKind::Http(e.to_string()),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(provider = self.provider_name, status = %status, body = %message, "API returned error");
            let kind = if status.as_u16() == 429 {
                ProviderErrorKind::RateLimit
            } else {
                ProviderErrorKind::Api {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(GatewayError::provider(self.provider_name, kind));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            GatewayError::provider(
                self.provider_name,
                ProviderErrorKind::ResponseParsing(e.to_string()),
            )
        })?;

        let text = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                GatewayError::provider(
                    self.provider_name,
                    ProviderErrorKind::ResponseParsing("response contained no choices".to_string()),
                )
            })?;

        Ok(DriverReply {
            text,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            tokens: parsed.usage.map(|u| u.total_tokens),
        })
    }
}
