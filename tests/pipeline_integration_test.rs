//! Integration tests for the research pipeline end-to-end flow
//!
//! These tests drive `ResearchManager` with fake LLM and notifier
//! implementations and verify:
//! 1. Stage sequencing and progress streaming
//! 2. Partial-failure tolerance in the search fan-out
//! 3. Fatal-error propagation from planning and synthesis
//! 4. Both notification-failure policies

use async_trait::async_trait;
use deep_research_backend::error::AppError;
use deep_research_backend::llm::LlmBackend;
use deep_research_backend::pipeline::config::{NotifyFailurePolicy, PipelineConfig};
use deep_research_backend::pipeline::events::ProgressEvent;
use deep_research_backend::pipeline::manager::ResearchManager;
use deep_research_backend::pipeline::notify::Notifier;
use deep_research_backend::pipeline::search::perform_searches;
use deep_research_backend::pipeline::types::{SearchItem, SearchPlan, Stage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Duration;

const PLAN_JSON: &str = r#"{
    "searches": [
        {"query": "alpha", "reason": "first angle"},
        {"query": "beta", "reason": "second angle"},
        {"query": "gamma", "reason": "third angle"}
    ]
}"#;

const REPORT_JSON: &str = r##"{
    "short_summary": "Short version.",
    "markdown_report": "# Full Report\n\nEverything we found.",
    "follow_up_questions": ["dig deeper"]
}"##;

/// Fake LLM backend scripted per pipeline stage
///
/// Stage calls are told apart by markers in the prompts: the planner prompt
/// says "research planner", the writer prompt says "senior researcher", and
/// search instructions carry a "Search term:" line.
struct FakeBackend {
    plan_response: Result<String, String>,
    report_response: Result<String, String>,
    failing_queries: HashSet<String>,
    search_delays_ms: HashMap<String, u64>,
}

impl FakeBackend {
    fn happy() -> Self {
        Self {
            plan_response: Ok(PLAN_JSON.to_string()),
            report_response: Ok(REPORT_JSON.to_string()),
            failing_queries: HashSet::new(),
            search_delays_ms: HashMap::new(),
        }
    }

    fn with_failing_queries(mut self, queries: &[&str]) -> Self {
        self.failing_queries = queries.iter().map(|q| q.to_string()).collect();
        self
    }
}

#[async_trait]
impl LlmBackend for FakeBackend {
    async fn complete(&self, prompt: &str, _force_json: bool) -> Result<String, AppError> {
        if prompt.contains("research planner") {
            return self
                .plan_response
                .clone()
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e)));
        }
        if prompt.contains("senior researcher") {
            return self
                .report_response
                .clone()
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e)));
        }

        // Search unit: find the search term, apply any scripted delay, then
        // succeed or fail per the script.
        let term = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Search term: "))
            .unwrap_or("")
            .to_string();

        if let Some(delay_ms) = self.search_delays_ms.get(&term) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }

        if self.failing_queries.contains(&term) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "simulated search failure for '{}'",
                term
            )));
        }

        Ok(format!("summary for {}", term))
    }
}

/// Fake notifier that records delivered bodies and can be told to fail
struct FakeNotifier {
    fail: bool,
    delivered: Mutex<Vec<String>>,
}

impl FakeNotifier {
    fn ok() -> Self {
        Self {
            fail: false,
            delivered: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            delivered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn deliver(&self, _subject: &str, body: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::NotificationFailed(
                "simulated delivery failure".to_string(),
            ));
        }
        self.delivered
            .lock()
            .expect("delivered lock poisoned")
            .push(body.to_string());
        Ok(())
    }
}

/// Run a manager to completion and collect every emitted event
async fn run_and_collect(
    manager: &ResearchManager,
    query: &str,
) -> (
    Result<deep_research_backend::pipeline::types::ReportData, AppError>,
    Vec<ProgressEvent>,
) {
    let (tx, mut rx) = mpsc::channel(64);
    let result = manager.run(query, tx).await;
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (result, events)
}

fn stage_index(events: &[ProgressEvent], stage: Stage) -> Option<usize> {
    events.iter().position(|event| {
        matches!(event, ProgressEvent::StageStarted { stage: s, .. } if *s == stage)
    })
}

/// Scenario A: all 3 searches succeed; pipeline reaches Done with the full
/// aggregate, and the final event carries the report markdown.
#[tokio::test]
async fn test_scenario_all_searches_succeed() {
    let manager = ResearchManager::new(
        Arc::new(FakeBackend::happy()),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    let report = result.expect("pipeline should succeed");
    assert_eq!(report.short_summary, "Short version.");

    // Plan had 3 searches and all completed.
    assert!(events.contains(&ProgressEvent::PlanReady { searches: 3 }));
    assert!(events.contains(&ProgressEvent::SearchProgress {
        completed: 3,
        total: 3
    }));

    // The Done transition is emitted, then the report markdown as the
    // final event.
    let done_at = stage_index(&events, Stage::Done).expect("done stage missing");
    assert_eq!(done_at, events.len() - 2);
    match events.last() {
        Some(ProgressEvent::Report { markdown }) => {
            assert_eq!(markdown, &report.markdown_report);
        }
        other => panic!("Expected final Report event, got {:?}", other),
    }
}

/// Scenario B: 2 of 3 searches fail; the pipeline still reaches Done.
#[tokio::test]
async fn test_scenario_partial_search_failure() {
    let backend = FakeBackend::happy().with_failing_queries(&["alpha", "gamma"]);
    let manager = ResearchManager::new(
        Arc::new(backend),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(result.is_ok(), "unit failures must not abort the pipeline");

    // All three units completed (successes and failures both tick).
    assert!(events.contains(&ProgressEvent::SearchProgress {
        completed: 3,
        total: 3
    }));
    // No error event anywhere.
    assert!(!events
        .iter()
        .any(|event| matches!(event, ProgressEvent::Error { .. })));
}

/// Scenario C: all searches fail; synthesis still runs with an empty
/// aggregate and the pipeline reaches Done.
#[tokio::test]
async fn test_scenario_total_search_failure() {
    let backend = FakeBackend::happy().with_failing_queries(&["alpha", "beta", "gamma"]);
    let manager = ResearchManager::new(
        Arc::new(backend),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(result.is_ok(), "an all-failed batch is not an error");
    assert!(stage_index(&events, Stage::Synthesizing).is_some());
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Report { .. })
    ));
}

/// Scenario D: planning fails; pipeline aborts before Searching and the
/// stream ends with a terminal error event carrying the reason.
#[tokio::test]
async fn test_scenario_planning_failure_aborts() {
    let backend = FakeBackend {
        plan_response: Err("planner exploded".to_string()),
        ..FakeBackend::happy()
    };
    let manager = ResearchManager::new(
        Arc::new(backend),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(matches!(result, Err(AppError::PlanningFailed(_))));

    // Searching never started and Done was never reached.
    assert!(stage_index(&events, Stage::Searching).is_none());
    assert!(stage_index(&events, Stage::Done).is_none());

    // Terminal event is an error including the underlying reason.
    match events.last() {
        Some(ProgressEvent::Error { message }) => {
            assert!(message.contains("planner exploded"));
        }
        other => panic!("Expected terminal Error event, got {:?}", other),
    }
}

/// Synthesis failure is fatal even though searching succeeded.
#[tokio::test]
async fn test_synthesis_failure_aborts() {
    let backend = FakeBackend {
        report_response: Err("writer exploded".to_string()),
        ..FakeBackend::happy()
    };
    let manager = ResearchManager::new(
        Arc::new(backend),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(matches!(result, Err(AppError::SynthesisFailed(_))));
    assert!(matches!(events.last(), Some(ProgressEvent::Error { .. })));
}

/// Scenario E, `Surface` policy (the default): a delivery failure ends the
/// stream with an error event and no report event follows.
#[tokio::test]
async fn test_scenario_notification_failure_surfaced() {
    let manager = ResearchManager::new(
        Arc::new(FakeBackend::happy()),
        Arc::new(FakeNotifier::failing()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(matches!(result, Err(AppError::NotificationFailed(_))));

    match events.last() {
        Some(ProgressEvent::Error { message }) => {
            assert!(message.contains("delivery failure"));
        }
        other => panic!("Expected terminal Error event, got {:?}", other),
    }
    assert!(!events
        .iter()
        .any(|event| matches!(event, ProgressEvent::Report { .. })));
}

/// Scenario E, `Swallow` policy: the failure is reported as a non-fatal
/// event and the stream still ends with the report markdown.
#[tokio::test]
async fn test_scenario_notification_failure_swallowed() {
    let mut config = PipelineConfig::default();
    config.on_notify_failure = NotifyFailurePolicy::Swallow;

    let manager = ResearchManager::new(
        Arc::new(FakeBackend::happy()),
        Arc::new(FakeNotifier::failing()),
        config,
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(result.is_ok(), "swallowed delivery failure must not fail the run");

    assert!(events
        .iter()
        .any(|event| matches!(event, ProgressEvent::NotificationFailed { .. })));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Report { .. })
    ));
}

/// Join completeness: Synthesizing never starts before every submitted unit
/// has completed.
#[tokio::test]
async fn test_synthesizing_waits_for_all_units() {
    let backend = FakeBackend {
        search_delays_ms: [("alpha", 40u64), ("beta", 5), ("gamma", 20)]
            .iter()
            .map(|(q, d)| (q.to_string(), *d))
            .collect(),
        ..FakeBackend::happy()
    };
    let manager = ResearchManager::new(
        Arc::new(backend),
        Arc::new(FakeNotifier::ok()),
        PipelineConfig::default(),
    );

    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(result.is_ok());

    let synthesizing_at =
        stage_index(&events, Stage::Synthesizing).expect("synthesizing stage missing");
    let final_tick_at = events
        .iter()
        .position(|event| {
            matches!(
                event,
                ProgressEvent::SearchProgress {
                    completed: 3,
                    total: 3
                }
            )
        })
        .expect("final progress tick missing");
    assert!(
        final_tick_at < synthesizing_at,
        "synthesizing started before the fan-out join completed"
    );
}

/// The report delivered to the notifier is the report streamed to the caller.
#[tokio::test]
async fn test_delivered_body_matches_report() {
    let notifier = Arc::new(FakeNotifier::ok());
    let manager = ResearchManager::new(
        Arc::new(FakeBackend::happy()),
        notifier.clone(),
        PipelineConfig::default(),
    );

    let (result, _) = run_and_collect(&manager, "test query").await;
    let report = result.unwrap();

    let delivered = notifier.delivered.lock().unwrap();
    assert_eq!(delivered.as_slice(), &[report.markdown_report]);
}

/// Order independence: with completion order artificially reversed between
/// runs, the aggregated output is the same set (order is incidental).
#[tokio::test]
async fn test_aggregate_is_order_independent() {
    let plan = SearchPlan {
        searches: ["alpha", "beta", "gamma"]
            .iter()
            .map(|q| SearchItem {
                query: q.to_string(),
                reason: "test".to_string(),
            })
            .collect(),
    };
    let config = PipelineConfig::default();

    let mut collected: Vec<HashSet<String>> = Vec::new();
    for delays in [
        [("alpha", 5u64), ("beta", 20), ("gamma", 40)],
        [("alpha", 40u64), ("beta", 20), ("gamma", 5)],
    ] {
        let backend = FakeBackend {
            search_delays_ms: delays.iter().map(|(q, d)| (q.to_string(), *d)).collect(),
            ..FakeBackend::happy()
        };
        let (tx, _rx) = mpsc::channel(64);
        let summaries = perform_searches(Arc::new(backend), &plan, &config, &tx).await;
        collected.push(summaries.into_iter().collect());
    }

    assert_eq!(collected[0], collected[1]);
    assert_eq!(collected[0].len(), 3);
}

/// The overall pipeline deadline turns a stuck stage into a timeout error.
#[tokio::test]
async fn test_pipeline_deadline() {
    struct StuckBackend;

    #[async_trait]
    impl LlmBackend for StuckBackend {
        async fn complete(&self, _prompt: &str, _force_json: bool) -> Result<String, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    let mut config = PipelineConfig::default();
    config.pipeline_timeout_secs = 1;

    let manager = ResearchManager::new(
        Arc::new(StuckBackend),
        Arc::new(FakeNotifier::ok()),
        config,
    );

    tokio::time::pause();
    let (result, events) = run_and_collect(&manager, "test query").await;
    assert!(matches!(result, Err(AppError::Timeout(_))));
    assert!(matches!(events.last(), Some(ProgressEvent::Error { .. })));
}
