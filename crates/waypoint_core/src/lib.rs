//! Core data types for the Waypoint analytics pipeline.
//!
//! This crate provides the foundation data types shared by the generation
//! gateway, the agents, and the result validator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod provider;
mod request;
mod usage;

pub use provider::Provider;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateRequestBuilderError, Generation,
    GenerationBuilder, GenerationBuilderError,
};
pub use usage::{NoopUsage, ProviderUsage, UsageMetrics, UsageReport, UsageSink};
