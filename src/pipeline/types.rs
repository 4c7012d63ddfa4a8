//! Pipeline data types
//!
//! The search plan produced by the planning stage, the per-unit outcome
//! produced by the search stage, the final report, and the stage enum that
//! the pipeline moves through.

use serde::{Deserialize, Serialize};

/// A single planned web search: what to search for, and why
///
/// Immutable once created; produced by the planner, consumed by the
/// fan-out scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchItem {
    /// The search term to use
    pub query: String,
    /// Why this search helps answer the research query
    pub reason: String,
}

/// The full set of searches planned for one research query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Planned searches, in the order the planner proposed them
    pub searches: Vec<SearchItem>,
}

impl SearchPlan {
    /// Validate the plan structure
    ///
    /// A usable plan has at least one search and no empty query strings.
    pub fn validate(&self) -> Result<(), String> {
        if self.searches.is_empty() {
            return Err("plan contains no searches".to_string());
        }
        for (idx, item) in self.searches.iter().enumerate() {
            if item.query.trim().is_empty() {
                return Err(format!("search {} has an empty query", idx + 1));
            }
        }
        Ok(())
    }
}

/// Outcome of one search unit
///
/// Per-unit failure is an expected, normal result, carried as a value rather
/// than an error so the scheduler's join logic needs no error handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search produced a summary
    Success(String),
    /// The search failed; the reason is logged and the unit is dropped
    Failure(String),
}

/// The final synthesized report
///
/// Created once by the synthesis stage, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    /// Short 2-3 sentence summary of the findings
    pub short_summary: String,
    /// The full report in markdown
    pub markdown_report: String,
    /// Suggested topics for follow-up research
    pub follow_up_questions: Vec<String>,
}

/// Pipeline stage
///
/// Stages advance strictly forward: Planning → Searching → Synthesizing →
/// Notifying → Done. There are no backward transitions and no concurrent
/// stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Generating the search plan
    Planning,
    /// Running the planned searches concurrently
    Searching,
    /// Writing the report from the collected summaries
    Synthesizing,
    /// Delivering the report
    Notifying,
    /// Terminal state
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Planning => "planning",
            Stage::Searching => "searching",
            Stage::Synthesizing => "synthesizing",
            Stage::Notifying => "notifying",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}
