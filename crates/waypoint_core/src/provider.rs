//! Generation provider identifiers.

use serde::{Deserialize, Serialize};

/// Supported text-generation providers.
///
/// The variant order here is the gateway's default fallback priority.
///
/// # Examples
///
/// ```
/// use waypoint_core::Provider;
/// use std::str::FromStr;
///
/// assert_eq!(format!("{}", Provider::Groq), "groq");
/// assert_eq!(Provider::from_str("openai").unwrap(), Provider::OpenAi);
/// assert!(Provider::from_str("mystery").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Groq LPU inference API (OpenAI-compatible)
    Groq,
    /// OpenAI chat completions API
    OpenAi,
    /// Google Gemini REST API
    Gemini,
    /// Deterministic local stub (development and tests)
    Local,
}
