//! Progress events
//!
//! The pipeline is the sole producer of these events; the SSE handler is the
//! single consumer. Events are pushed through an mpsc channel at every stage
//! boundary and at every search completion tick. A successful run ends with
//! a `Report` event carrying the markdown; a fatal failure ends with an
//! `Error` event. The stream is not resumable.

use crate::pipeline::types::Stage;
use serde::Serialize;

/// A single status event emitted over the progress stream
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A pipeline stage has started
    StageStarted {
        /// The stage being entered
        stage: Stage,
        /// Human-readable status line
        message: String,
    },
    /// The planner produced a plan
    PlanReady {
        /// Number of searches the plan contains
        searches: usize,
    },
    /// One search unit completed (successfully or not)
    SearchProgress {
        /// Units completed so far, monotonically increasing
        completed: usize,
        /// Total units submitted
        total: usize,
    },
    /// Report delivery failed under the `Swallow` policy (non-fatal)
    NotificationFailed {
        /// Why delivery failed
        reason: String,
    },
    /// Fatal pipeline failure; this is the terminal event of a failed run
    Error {
        /// What failed, including the underlying reason for diagnosis
        message: String,
    },
    /// The finished report; this is the terminal event of a successful run
    Report {
        /// The full report in markdown
        markdown: String,
    },
}

impl ProgressEvent {
    /// Convenience constructor for stage transitions
    pub fn stage(stage: Stage, message: impl Into<String>) -> Self {
        ProgressEvent::StageStarted {
            stage,
            message: message.into(),
        }
    }
}
