//! Cooperating agents for the Waypoint analytics pipeline.
//!
//! Four agents share the generation gateway: the intent router classifies a
//! free-text question and dispatches it, the SQL agent turns a question into
//! one validated SELECT and executes it through the security gate, the
//! documentation agent answers definition questions without touching the
//! database, and the result validator cross-checks executed rows against the
//! golden-query corpus to produce a trust score.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod doc_agent;
mod parse;
mod router;
mod sql_agent;
mod validator;

pub use context::{ContextBuilder, StaticContextBuilder};
pub use doc_agent::{DocAgent, DocResponse};
pub use parse::{ParsedGeneration, extract_confidence, extract_explanation, extract_sql,
    parse_generation};
pub use router::{AgentKind, AgentResponse, Intent, IntentRouter, RoutedResponse};
pub use sql_agent::{SqlAgent, SqlAgentResponse};
pub use validator::{ValidationReport, ValidatorAgent, compare_results, compare_rows,
    sql_similarity};
