//! Trait definition for generation backends.

use async_trait::async_trait;
use waypoint_core::{GenerateRequest, Provider};
use waypoint_error::GatewayError;

/// A single provider's raw reply before the gateway normalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverReply {
    /// Generated text
    pub text: String,
    /// Model identifier reported by the provider
    pub model: String,
    /// Total token count when the provider reports one
    pub tokens: Option<u64>,
}

/// Core trait every generation backend implements.
///
/// Drivers are registered with the [`crate::Gateway`] in priority order; the
/// gateway owns retry and fallback, so a driver only needs to do one attempt
/// and report failures as [`GatewayError`] with the right provider kind.
#[async_trait]
pub trait GenerationDriver: Send + Sync {
    /// Perform one generation attempt.
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError>;

    /// Which provider this driver speaks for.
    fn provider(&self) -> Provider;

    /// Model identifier this driver targets.
    fn model_name(&self) -> &str;
}
