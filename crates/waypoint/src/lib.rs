//! Waypoint — natural-language analytics over a relational dataset.
//!
//! Waypoint answers free-text analytics questions in four cooperating
//! stages: an intent router decides whether a question wants data or
//! documentation, a SQL agent turns data questions into a single validated
//! `SELECT` and executes it behind a security gate, a documentation agent
//! answers definitional questions, and a result validator scores executed
//! answers against a curated golden-query corpus. Every model call goes
//! through one multi-provider gateway with per-driver retry and ordered
//! fallback.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waypoint::{Pipeline, PipelineConfig, StaticContextBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     waypoint::init_telemetry()?;
//!
//!     let context = Arc::new(StaticContextBuilder::new(
//!         "Tables: trips(id, status, fare, driver_id), drivers(id, name)",
//!     ));
//!     let pipeline = Pipeline::from_env(PipelineConfig::default(), context)?;
//!
//!     let answer = pipeline.ask("How many trips completed yesterday?", None).await?;
//!     println!("{}", serde_json::to_string_pretty(&answer)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The workspace is organized as focused crates, all re-exported here:
//!
//! - `waypoint_core` — request/result types, providers, usage accounting
//! - `waypoint_error` — error kinds with source-location tracking
//! - `waypoint_gateway` — drivers, retry, and fallback
//! - `waypoint_security` — SQL gate, safe executor, rate limiter
//! - `waypoint_database` — connection pool and golden-query storage
//! - `waypoint_agents` — router, SQL agent, doc agent, validator

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pipeline;
mod telemetry;

pub use pipeline::{Pipeline, PipelineAnswer, PipelineConfig};
pub use telemetry::init_telemetry;

pub use waypoint_agents::*;
pub use waypoint_core::*;
pub use waypoint_database::*;
pub use waypoint_error::*;
pub use waypoint_gateway::*;
pub use waypoint_security::*;
