//! End-to-end pipeline wiring.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use waypoint_agents::{
    AgentResponse, ContextBuilder, DocAgent, IntentRouter, SqlAgent, ValidationReport,
    ValidatorAgent,
};
use waypoint_core::{Provider, UsageMetrics, UsageReport};
use waypoint_database::{PostgresGoldenQueryRepository, establish_pool};
use waypoint_error::{GatewayError, GatewayErrorKind, WaypointResult};
use waypoint_gateway::{
    Gateway, GeminiDriver, GenerationDriver, GroqDriver, LocalDriver, OpenAiDriver, RetryPolicy,
};
use waypoint_security::{
    DEFAULT_STATEMENT_TIMEOUT_SECS, PgExecutor, QueryOutcome, RateLimiter, SafeExecutor,
    SystemClock,
};

/// Identifier charged by [`Pipeline::ask`] when the caller has no identity of
/// its own.
const GLOBAL_CALLER: &str = "global";

/// Deployment-level pipeline settings.
///
/// The defaults match the intended production posture: all remote providers
/// in priority order with the local stub as a last resort, ten questions per
/// caller per minute, and a five-second statement timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Provider priority order; drivers are registered in this order
    pub providers: Vec<Provider>,
    /// Model served through Groq
    pub groq_model: String,
    /// Model served through OpenAI
    pub openai_model: String,
    /// Model served through Gemini
    pub gemini_model: String,
    /// Retry bounds applied per driver attempt
    pub retry: RetryPolicy,
    /// Server-side statement timeout for generated SQL, in seconds
    pub statement_timeout_seconds: u64,
    /// Questions admitted per caller per window
    pub rate_limit_max_requests: u32,
    /// Rate-limit window length in seconds
    pub rate_limit_window_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                Provider::Groq,
                Provider::OpenAi,
                Provider::Gemini,
                Provider::Local,
            ],
            groq_model: "llama-3.3-70b-versatile".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            retry: RetryPolicy::default(),
            statement_timeout_seconds: DEFAULT_STATEMENT_TIMEOUT_SECS,
            rate_limit_max_requests: 10,
            rate_limit_window_seconds: 60,
        }
    }
}

/// One answered question, with its trust assessment when rows were produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineAnswer {
    /// The routed agent response
    #[serde(flatten)]
    pub routed: waypoint_agents::RoutedResponse,
    /// Validation report; present only for SQL answers that produced rows
    pub validation: Option<ValidationReport>,
    /// Wall-clock duration of the whole ask, in milliseconds
    pub duration_ms: u64,
}

/// Executor wrapper that pins the configured statement timeout.
struct ConfiguredExecutor {
    inner: Arc<dyn SafeExecutor>,
    timeout_seconds: u64,
}

impl SafeExecutor for ConfiguredExecutor {
    fn execute_with_timeout(&self, sql: &str, timeout_seconds: u64) -> QueryOutcome {
        self.inner.execute_with_timeout(sql, timeout_seconds)
    }

    fn execute(&self, sql: &str) -> QueryOutcome {
        self.inner.execute_with_timeout(sql, self.timeout_seconds)
    }
}

/// The assembled question-answering pipeline.
///
/// Owns the intent router, the result validator, the per-caller rate limiter,
/// and the shared usage counters. One instance serves many concurrent
/// callers.
pub struct Pipeline {
    router: IntentRouter,
    validator: ValidatorAgent,
    limiter: RateLimiter,
    usage: Arc<UsageMetrics>,
}

impl Pipeline {
    /// Assemble a pipeline from prebuilt collaborators.
    pub fn new(
        router: IntentRouter,
        validator: ValidatorAgent,
        limiter: RateLimiter,
        usage: Arc<UsageMetrics>,
    ) -> Self {
        Self {
            router,
            validator,
            limiter,
            usage,
        }
    }

    /// Build the production pipeline from the environment.
    ///
    /// Loads `.env` when present, constructs one driver per configured
    /// provider (skipping remote providers whose API key is absent), and
    /// connects the executor and golden-query repository through
    /// `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Fails when no driver could be constructed or the database pool cannot
    /// be established.
    pub fn from_env(
        config: PipelineConfig,
        context: Arc<dyn ContextBuilder>,
    ) -> WaypointResult<Self> {
        dotenvy::dotenv().ok();

        let mut drivers: Vec<Arc<dyn GenerationDriver>> = Vec::new();
        for provider in &config.providers {
            match build_driver(*provider, &config) {
                Ok(driver) => drivers.push(driver),
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Skipping unavailable provider");
                }
            }
        }
        if drivers.is_empty() {
            return Err(GatewayError::new(GatewayErrorKind::AllProvidersExhausted(
                "no generation drivers could be constructed from the environment".to_string(),
            ))
            .into());
        }

        let usage = Arc::new(UsageMetrics::default());
        let mut gateway = Gateway::builder()
            .usage(Arc::clone(&usage) as Arc<dyn waypoint_core::UsageSink>)
            .retry(config.retry);
        for driver in drivers {
            gateway = gateway.driver(driver);
        }
        let gateway = Arc::new(gateway.build());

        let pool = establish_pool()?;
        let executor: Arc<dyn SafeExecutor> = Arc::new(ConfiguredExecutor {
            inner: Arc::new(PgExecutor::new(pool.clone())),
            timeout_seconds: config.statement_timeout_seconds,
        });
        let repo = Arc::new(PostgresGoldenQueryRepository::new(pool));

        let sql_agent = SqlAgent::new(
            Arc::clone(&gateway),
            Arc::clone(&context),
            Arc::clone(&executor),
        );
        let doc_agent = DocAgent::new(Arc::clone(&gateway), context);
        let router = IntentRouter::new(gateway, sql_agent, doc_agent);
        let validator = ValidatorAgent::new(repo, executor);
        let limiter = RateLimiter::new(
            config.rate_limit_max_requests,
            config.rate_limit_window_seconds,
            Arc::new(SystemClock),
        );

        info!("Pipeline assembled");
        Ok(Self::new(router, validator, limiter, usage))
    }

    /// Answer a question on behalf of an anonymous caller.
    ///
    /// # Errors
    ///
    /// Returns a rate-limit error when the shared window is exhausted. Agent
    /// and gateway faults never surface here; they degrade into the answer.
    pub async fn ask(
        &self,
        question: &str,
        provider: Option<Provider>,
    ) -> WaypointResult<PipelineAnswer> {
        self.ask_from(GLOBAL_CALLER, question, provider).await
    }

    /// Answer a question charged against a specific caller identifier.
    ///
    /// # Errors
    ///
    /// Returns a rate-limit error when the caller's window is exhausted.
    #[instrument(skip(self, question), fields(caller, question_len = question.len()))]
    pub async fn ask_from(
        &self,
        caller: &str,
        question: &str,
        provider: Option<Provider>,
    ) -> WaypointResult<PipelineAnswer> {
        let started = Instant::now();
        self.limiter.check(caller)?;

        let routed = self.router.route(question, provider).await;

        // Trust scoring applies only to successfully executed SQL answers.
        let validation = match &routed.response {
            AgentResponse::Sql(resp) if resp.error.is_none() => match (&resp.sql, &resp.rows) {
                (Some(sql), Some(rows)) => Some(self.validator.validate(question, sql, rows)),
                _ => None,
            },
            _ => None,
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            agent = %routed.agent,
            validated = validation.is_some(),
            duration_ms,
            "Question answered"
        );

        Ok(PipelineAnswer {
            routed,
            validation,
            duration_ms,
        })
    }

    /// Snapshot of cumulative provider usage.
    pub fn usage(&self) -> UsageReport {
        self.usage.snapshot()
    }
}

fn build_driver(
    provider: Provider,
    config: &PipelineConfig,
) -> Result<Arc<dyn GenerationDriver>, GatewayError> {
    let driver: Arc<dyn GenerationDriver> = match provider {
        Provider::Groq => Arc::new(GroqDriver::new(config.groq_model.clone())?),
        Provider::OpenAi => Arc::new(OpenAiDriver::new(config.openai_model.clone())?),
        Provider::Gemini => Arc::new(GeminiDriver::new(config.gemini_model.clone())?),
        Provider::Local => Arc::new(LocalDriver::new()),
    };
    Ok(driver)
}
