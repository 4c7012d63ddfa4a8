//! Research pipeline manager
//!
//! Drives one research run through its stages: Planning → Searching →
//! Synthesizing → Notifying → Done. Stages are strictly sequential with no
//! backward transitions and no retries. Progress events are pushed to the
//! single consumer after every transition and every search completion.
//!
//! Failure semantics per stage:
//! - Planning: fatal, no fallback plan.
//! - Searching: never fatal; failed units are dropped and an all-failed
//!   batch proceeds with an empty aggregate.
//! - Synthesizing: fatal.
//! - Notifying: governed by `NotifyFailurePolicy` (default `Surface`).
//!
//! The whole run is wrapped in an overall deadline so a stuck external call
//! cannot hold resources indefinitely.

use crate::error::AppError;
use crate::llm::LlmBackend;
use crate::pipeline::config::{NotifyFailurePolicy, PipelineConfig};
use crate::pipeline::events::ProgressEvent;
use crate::pipeline::notify::Notifier;
use crate::pipeline::types::{ReportData, Stage};
use crate::pipeline::{planner, search, writer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

/// Subject line used for report delivery
const REPORT_SUBJECT: &str = "Research report";

/// Orchestrates one research pipeline run
pub struct ResearchManager {
    backend: Arc<dyn LlmBackend>,
    notifier: Arc<dyn Notifier>,
    config: PipelineConfig,
}

impl ResearchManager {
    /// Create a manager from its collaborators and configuration
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            config,
        }
    }

    /// The configuration this manager runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for one research query
    ///
    /// Progress events are pushed to `events` as the run advances. On
    /// success the final event carries the report markdown and the report is
    /// returned; on fatal failure a terminal error event is emitted and the
    /// error is returned. A dropped receiver does not abort the run.
    pub async fn run(
        &self,
        query: &str,
        events: mpsc::Sender<ProgressEvent>,
    ) -> Result<ReportData, AppError> {
        let deadline = Duration::from_secs(self.config.pipeline_timeout_secs);

        match timeout(deadline, self.run_stages(query, &events)).await {
            Ok(result) => result,
            Err(_) => {
                let error = AppError::Timeout(format!(
                    "pipeline timed out after {} seconds",
                    deadline.as_secs()
                ));
                self.emit_error(&events, &error).await;
                Err(error)
            }
        }
    }

    /// Walk the stages in order; see the module docs for failure semantics
    async fn run_stages(
        &self,
        query: &str,
        events: &mpsc::Sender<ProgressEvent>,
    ) -> Result<ReportData, AppError> {
        // Planning
        self.emit(
            events,
            ProgressEvent::stage(Stage::Planning, "Planning searches..."),
        )
        .await;

        let plan = match planner::plan_searches(
            self.backend.as_ref(),
            query,
            self.config.search_count,
        )
        .await
        {
            Ok(plan) => plan,
            Err(error) => {
                tracing::error!(error = %error, "Planning failed, aborting pipeline");
                self.emit_error(events, &error).await;
                return Err(error);
            }
        };

        self.emit(
            events,
            ProgressEvent::PlanReady {
                searches: plan.searches.len(),
            },
        )
        .await;

        // Searching: never fatal, regardless of how many units succeed.
        self.emit(
            events,
            ProgressEvent::stage(Stage::Searching, "Searching..."),
        )
        .await;

        let summaries =
            search::perform_searches(self.backend.clone(), &plan, &self.config, events).await;

        // Synthesizing
        self.emit(
            events,
            ProgressEvent::stage(Stage::Synthesizing, "Writing report..."),
        )
        .await;

        let report = match writer::write_report(self.backend.as_ref(), query, &summaries).await {
            Ok(report) => report,
            Err(error) => {
                tracing::error!(error = %error, "Synthesis failed, aborting pipeline");
                self.emit_error(events, &error).await;
                return Err(error);
            }
        };

        // Notifying
        self.emit(
            events,
            ProgressEvent::stage(Stage::Notifying, "Sending report..."),
        )
        .await;

        if let Err(error) = self
            .notifier
            .deliver(REPORT_SUBJECT, &report.markdown_report)
            .await
        {
            match self.config.on_notify_failure {
                NotifyFailurePolicy::Surface => {
                    tracing::error!(error = %error, "Report delivery failed, surfacing");
                    self.emit_error(events, &error).await;
                    return Err(error);
                }
                NotifyFailurePolicy::Swallow => {
                    tracing::warn!(error = %error, "Report delivery failed, swallowing");
                    self.emit(
                        events,
                        ProgressEvent::NotificationFailed {
                            reason: error.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        // Done, then the report markdown as the final event of the run.
        self.emit(events, ProgressEvent::stage(Stage::Done, "Research complete"))
            .await;
        self.emit(
            events,
            ProgressEvent::Report {
                markdown: report.markdown_report.clone(),
            },
        )
        .await;

        tracing::debug!(
            report_len = report.markdown_report.len(),
            "Pipeline run complete"
        );

        Ok(report)
    }

    async fn emit(&self, events: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) {
        // Receiver drop means the caller disconnected; the run finishes anyway.
        let _ = events.send(event).await;
    }

    async fn emit_error(&self, events: &mpsc::Sender<ProgressEvent>, error: &AppError) {
        self.emit(
            events,
            ProgressEvent::Error {
                message: error.to_string(),
            },
        )
        .await;
    }
}
