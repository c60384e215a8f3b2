//! Multi-provider text-generation gateway.
//!
//! Every LLM call in the pipeline funnels through [`Gateway`], which wraps a
//! fixed priority list of [`GenerationDriver`] implementations with bounded
//! per-driver retry and ordered fallback across drivers.
//!
//! # Example
//!
//! ```no_run
//! use waypoint_gateway::{Gateway, GroqDriver, LocalDriver};
//! use waypoint_core::{GenerateRequest, NoopUsage};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::builder()
//!     .driver(Arc::new(GroqDriver::new("llama-3.1-8b-instant".to_string())?))
//!     .driver(Arc::new(LocalDriver::new()))
//!     .usage(Arc::new(NoopUsage))
//!     .build();
//!
//! let request = GenerateRequest::builder()
//!     .prompt("How many trips completed yesterday?")
//!     .build()?;
//! let generation = gateway.generate(&request).await?;
//! println!("{}", generation.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod gateway;
mod gemini;
mod groq;
mod local;
mod openai;
mod openai_compat;

pub use driver::{DriverReply, GenerationDriver};
pub use gateway::{Gateway, GatewayBuilder, RetryPolicy};
pub use gemini::GeminiDriver;
pub use groq::GroqDriver;
pub use local::LocalDriver;
pub use openai::OpenAiDriver;
pub use openai_compat::OpenAiCompatibleClient;
