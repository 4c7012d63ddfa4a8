//! Searching stage: fan-out scheduler and partial-failure aggregator
//!
//! One tokio task is spawned per planned search, bounded by a semaphore.
//! Results are consumed in completion order, not submission order, so the
//! aggregated list's ordering is incidental; only its contents matter.
//! A progress tick is emitted after every completion, and the scheduler
//! waits for the slowest unit before returning. Failed units are logged and
//! dropped; an all-failed batch yields an empty aggregate, which is not an
//! error at this layer.

use crate::llm::LlmBackend;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::events::ProgressEvent;
use crate::pipeline::types::{SearchItem, SearchOutcome, SearchPlan};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

/// Execute one search unit
///
/// Any failure of the external call (including timeout) is returned as
/// `SearchOutcome::Failure`; this function never propagates an error.
pub async fn run_search(
    backend: &dyn LlmBackend,
    item: &SearchItem,
    timeout_secs: u64,
) -> SearchOutcome {
    let instruction = search_instruction(item);

    match timeout(
        Duration::from_secs(timeout_secs),
        backend.complete(&instruction, false),
    )
    .await
    {
        Ok(Ok(summary)) => SearchOutcome::Success(summary),
        Ok(Err(e)) => SearchOutcome::Failure(e.to_string()),
        Err(_) => SearchOutcome::Failure(format!(
            "search timed out after {} seconds",
            timeout_secs
        )),
    }
}

/// Run all planned searches concurrently and aggregate the successes
///
/// Spawns one task per item (at most `max_concurrent_searches` in flight),
/// joins them in completion order, and sends a `SearchProgress` event after
/// each completion. Returns only the successful summaries; their order is
/// completion order and must not be relied upon downstream.
pub async fn perform_searches(
    backend: Arc<dyn LlmBackend>,
    plan: &SearchPlan,
    config: &PipelineConfig,
    events: &mpsc::Sender<ProgressEvent>,
) -> Vec<String> {
    let total = plan.searches.len();
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_searches));
    let timeout_secs = config.search_timeout_secs;

    let mut join_set = JoinSet::new();
    for item in plan.searches.iter().cloned() {
        let backend = backend.clone();
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return SearchOutcome::Failure("scheduler shut down".to_string());
                }
            };
            run_search(backend.as_ref(), &item, timeout_secs).await
        });
    }

    let mut summaries = Vec::new();
    let mut completed = 0usize;

    while let Some(joined) = join_set.join_next().await {
        completed += 1;
        match joined {
            Ok(SearchOutcome::Success(summary)) => summaries.push(summary),
            Ok(SearchOutcome::Failure(reason)) => {
                tracing::warn!(reason = %reason, "Search unit failed, dropping result");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search task panicked, dropping result");
            }
        }

        // Receiver drop just means nobody is watching progress anymore.
        let _ = events
            .send(ProgressEvent::SearchProgress { completed, total })
            .await;
    }

    tracing::debug!(
        total = total,
        succeeded = summaries.len(),
        "Search fan-out complete"
    );

    summaries
}

/// Format the instruction for one search unit from its query and rationale
fn search_instruction(item: &SearchItem) -> String {
    format!(
        "You are a research assistant. Search the web for the term below and produce a concise \
         summary of the results. The summary must be 2-3 paragraphs and less than 300 words. \
         Capture the main points; ignore any fluff. This will be consumed by someone synthesizing \
         a report, so do not include any commentary other than the summary itself.\n\n\
         Search term: {}\nReason for searching: {}",
        item.query, item.reason
    )
}
