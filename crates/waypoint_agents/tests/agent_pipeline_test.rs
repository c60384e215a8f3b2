//! End-to-end agent behavior over a scripted gateway and a fake store.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use waypoint_agents::{
    AgentKind, AgentResponse, DocAgent, Intent, IntentRouter, SqlAgent, StaticContextBuilder,
    ValidatorAgent,
};
use waypoint_core::{GenerateRequest, Provider};
use waypoint_database::{GoldenQuery, InMemoryGoldenQueryRepository};
use waypoint_error::{GatewayError, ProviderErrorKind};
use waypoint_gateway::{DriverReply, Gateway, GenerationDriver};
use waypoint_security::{QueryOutcome, Row, SafeExecutor};

const CANNED_SQL_RESPONSE: &str = "```sql\nSELECT COUNT(*) AS total_count\nFROM trips\nWHERE status = 'completed';\n```\n\nExplanation: Counts all completed trips.\n\nConfidence: High";

/// Driver that answers the classifier prompt with a fixed label and every
/// other prompt with a fixed body.
struct ScriptedDriver {
    intent_label: &'static str,
    body: &'static str,
}

#[async_trait]
impl GenerationDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        let text = if req
            .system_prompt
            .as_deref()
            .is_some_and(|s| s.contains("intent classifier"))
        {
            self.intent_label
        } else {
            self.body
        };
        Ok(DriverReply {
            text: text.to_string(),
            model: "scripted".to_string(),
            tokens: Some(10),
        })
    }

    fn provider(&self) -> Provider {
        Provider::Local
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Driver whose every attempt fails with a non-retryable error.
struct DownDriver;

#[async_trait]
impl GenerationDriver for DownDriver {
    async fn generate(&self, _req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
        Err(GatewayError::provider(
            "local",
            ProviderErrorKind::MissingApiKey("LOCAL_API_KEY not set".to_string()),
        ))
    }

    fn provider(&self) -> Provider {
        Provider::Local
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

struct FixedExecutor {
    outcome: QueryOutcome,
}

impl SafeExecutor for FixedExecutor {
    fn execute_with_timeout(&self, _sql: &str, _timeout_seconds: u64) -> QueryOutcome {
        self.outcome.clone()
    }
}

fn gateway(driver: impl GenerationDriver + 'static) -> Arc<Gateway> {
    Arc::new(Gateway::builder().driver(Arc::new(driver)).build())
}

fn context() -> Arc<StaticContextBuilder> {
    Arc::new(StaticContextBuilder::new("Tables: trips(id, status, fare)"))
}

fn sql_agent(gateway: Arc<Gateway>, outcome: QueryOutcome) -> SqlAgent {
    SqlAgent::new(gateway, context(), Arc::new(FixedExecutor { outcome }))
}

fn router(driver: ScriptedDriver, outcome: QueryOutcome) -> IntentRouter {
    let gw = gateway(driver);
    let sql = sql_agent(Arc::clone(&gw), outcome);
    let doc = DocAgent::new(Arc::clone(&gw), context());
    IntentRouter::new(gw, sql, doc)
}

fn count_row(total: i64) -> Row {
    let mut row = Row::new();
    row.insert("total_count".to_string(), json!(total));
    row
}

#[tokio::test]
async fn definitional_question_routes_to_documentation() {
    let router = router(
        ScriptedDriver {
            intent_label: "DOCUMENTATION",
            body: "USNC stands for US and Canada.",
        },
        QueryOutcome::ok(vec![]),
    );

    let routed = router.route("What does USNC mean?", None).await;
    assert_eq!(routed.agent, AgentKind::Doc);
    match routed.response {
        AgentResponse::Doc(doc) => {
            assert_eq!(doc.answer.as_deref(), Some("USNC stands for US and Canada."));
            assert_eq!(doc.error, None);
        }
        AgentResponse::Sql(_) => panic!("expected a documentation response"),
    }
}

#[tokio::test]
async fn doc_agent_grounds_its_prompt_in_the_context() {
    /// Echoes the prompt back so the test can see what the agent sent.
    struct EchoDriver;

    #[async_trait]
    impl GenerationDriver for EchoDriver {
        async fn generate(&self, req: &GenerateRequest) -> Result<DriverReply, GatewayError> {
            Ok(DriverReply {
                text: req.prompt.clone(),
                model: "echo".to_string(),
                tokens: Some(1),
            })
        }

        fn provider(&self) -> Provider {
            Provider::Local
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    let agent = DocAgent::new(
        gateway(EchoDriver),
        Arc::new(StaticContextBuilder::new(
            "Business Terms: USNC = US and Canada region",
        )),
    );

    let resp = agent.answer("What does USNC mean?", None).await;
    let prompt = resp.answer.expect("echo driver always answers");
    assert!(prompt.starts_with("Business Terms: USNC = US and Canada region"));
    assert!(prompt.contains("User Question: What does USNC mean?"));
}

#[tokio::test]
async fn data_question_generates_validates_and_executes() {
    let router = router(
        ScriptedDriver {
            intent_label: "SQL_QUERY",
            body: CANNED_SQL_RESPONSE,
        },
        QueryOutcome::ok(vec![count_row(1523)]),
    );

    let routed = router.route("How many trips completed?", None).await;
    assert_eq!(routed.agent, AgentKind::Sql);
    let AgentResponse::Sql(resp) = routed.response else {
        panic!("expected a SQL response");
    };

    let sql = resp.sql.expect("SQL should be extracted");
    assert!(sql.starts_with("SELECT COUNT(*)"));
    assert_eq!(resp.confidence_score, 0.9);
    assert_eq!(resp.row_count, 1);
    assert_eq!(resp.rows.unwrap()[0]["total_count"], json!(1523));
    assert_eq!(resp.explanation, "Counts all completed trips.");
    assert_eq!(resp.provider.as_deref(), Some("local"));
    assert_eq!(resp.error, None);
}

#[tokio::test]
async fn unrecognized_label_defaults_to_data_query() {
    let router = router(
        ScriptedDriver {
            intent_label: "SHRUG",
            body: CANNED_SQL_RESPONSE,
        },
        QueryOutcome::ok(vec![count_row(0)]),
    );

    let routed = router.route("hmm", None).await;
    assert_eq!(routed.agent, AgentKind::Sql);
}

#[tokio::test]
async fn empty_label_defaults_to_data_query() {
    let router = router(
        ScriptedDriver {
            intent_label: "",
            body: CANNED_SQL_RESPONSE,
        },
        QueryOutcome::ok(vec![]),
    );

    assert_eq!(router.classify("hmm").await, Intent::DataQuery);
}

#[tokio::test]
async fn classification_failure_defaults_to_data_query() {
    let gw = gateway(DownDriver);
    let sql = sql_agent(Arc::clone(&gw), QueryOutcome::ok(vec![]));
    let doc = DocAgent::new(Arc::clone(&gw), context());
    let router = IntentRouter::new(gw, sql, doc);

    assert_eq!(router.classify("anything at all").await, Intent::DataQuery);

    // The SQL agent then degrades, because generation is down too.
    let routed = router.route("anything at all", None).await;
    let AgentResponse::Sql(resp) = routed.response else {
        panic!("expected a SQL response");
    };
    assert!(resp.error.unwrap().starts_with("Generation failed:"));
    assert_eq!(resp.confidence_score, 0.0);
    assert_eq!(resp.rows, None);
}

#[tokio::test]
async fn hostile_generation_is_blocked_before_execution() {
    let agent = sql_agent(
        gateway(ScriptedDriver {
            intent_label: "SQL_QUERY",
            body: "```sql\nDROP TABLE trips;\n```\n\nConfidence: High",
        }),
        QueryOutcome::ok(vec![count_row(1)]),
    );

    let resp = agent.answer("delete everything", None).await;
    assert_eq!(resp.sql.as_deref(), Some("DROP TABLE trips;"));
    assert_eq!(resp.confidence_score, 0.0);
    assert_eq!(resp.rows, None);
    let error = resp.error.unwrap();
    assert!(error.starts_with("Security validation failed:"), "{error}");
}

#[tokio::test]
async fn prose_without_sql_degrades() {
    let agent = sql_agent(
        gateway(ScriptedDriver {
            intent_label: "SQL_QUERY",
            body: "I am not sure how to answer that.",
        }),
        QueryOutcome::ok(vec![]),
    );

    let resp = agent.answer("what color is the database", None).await;
    assert_eq!(resp.sql, None);
    assert_eq!(resp.confidence_score, 0.0);
    assert_eq!(
        resp.error.as_deref(),
        Some("No SQL statement found in model response")
    );
}

#[tokio::test]
async fn execution_failure_keeps_sql_and_confidence() {
    let agent = sql_agent(
        gateway(ScriptedDriver {
            intent_label: "SQL_QUERY",
            body: CANNED_SQL_RESPONSE,
        }),
        QueryOutcome::failed("canceling statement due to statement timeout"),
    );

    let resp = agent.answer("How many trips completed?", None).await;
    assert!(resp.sql.is_some());
    assert_eq!(resp.confidence_score, 0.9);
    assert_eq!(resp.rows, None);
    assert!(resp.error.unwrap().contains("statement timeout"));
}

#[tokio::test]
async fn validated_answer_earns_full_trust_on_exact_match() {
    let generated_rows = vec![count_row(1523)];
    let golden_sql = "SELECT COUNT(*) AS total_count\nFROM trips\nWHERE status = 'completed';";

    let validator = ValidatorAgent::new(
        Arc::new(InMemoryGoldenQueryRepository::new(vec![GoldenQuery {
            id: 1,
            question: "How many trips completed?".to_string(),
            sql_query: golden_sql.to_string(),
            category: Some("trips".to_string()),
            is_active: true,
        }])),
        Arc::new(FixedExecutor {
            outcome: QueryOutcome::ok(generated_rows.clone()),
        }),
    );

    let report = validator.validate("How many trips completed?", golden_sql, &generated_rows);
    assert_eq!(report.trust_score, 1.0);
    assert_eq!(
        report.matched_reference.as_deref(),
        Some("How many trips completed?")
    );
}
