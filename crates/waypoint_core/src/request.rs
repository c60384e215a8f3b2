//! Request and result types for text generation.

use crate::Provider;
use serde::{Deserialize, Serialize};

/// A single text-generation request.
///
/// Constructed per call and never mutated after the gateway returns.
///
/// # Examples
///
/// ```
/// use waypoint_core::GenerateRequest;
///
/// let request = GenerateRequest::builder()
///     .prompt("How many trips completed yesterday?")
///     .temperature(0.3)
///     .max_tokens(1000u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.temperature, 0.3);
/// assert_eq!(request.timeout_seconds, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// The user prompt to send
    pub prompt: String,
    /// Optional system instructions
    #[builder(default)]
    pub system_prompt: Option<String>,
    /// Sampling temperature (0.0 to 1.0)
    #[builder(default = "0.7")]
    pub temperature: f32,
    /// Maximum number of tokens to generate
    #[builder(default = "2000")]
    pub max_tokens: u32,
    /// Per-attempt request timeout in seconds
    #[builder(default = "30")]
    pub timeout_seconds: u64,
    /// Provider to try first; gateway default when absent
    #[builder(default)]
    pub provider: Option<Provider>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// The normalized result of a generation call.
///
/// Every provider's response is converted into this shape by the gateway.
///
/// # Examples
///
/// ```
/// use waypoint_core::{Generation, Provider};
///
/// let generation = Generation::builder()
///     .text("SELECT 1")
///     .provider(Provider::Local)
///     .model("local-stub")
///     .tokens(2u64)
///     .duration_ms(12u64)
///     .build()
///     .unwrap();
///
/// assert!(!generation.fallback_used());
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder, derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct Generation {
    /// The generated text
    text: String,
    /// Provider that produced the response
    provider: Provider,
    /// Model identifier reported by the provider
    model: String,
    /// Total token count, estimated when the provider reports none
    tokens: u64,
    /// Wall-clock duration of the whole gateway call in milliseconds
    duration_ms: u64,
    /// True iff the primary provider failed and a secondary one answered
    #[builder(default)]
    fallback_used: bool,
}

impl Generation {
    /// Start building a generation result.
    pub fn builder() -> GenerationBuilder {
        GenerationBuilder::default()
    }
}
