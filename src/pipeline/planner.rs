//! Planning stage
//!
//! Sends a planning prompt to the model (with JSON mode enabled) asking it to
//! break a research query into a fixed number of web searches, each with a
//! rationale. A failure here is fatal to the whole pipeline: there is no
//! fallback plan and no retry.

use crate::error::AppError;
use crate::llm::LlmBackend;
use crate::pipeline::types::SearchPlan;

/// Generate a search plan for a research query
///
/// # Arguments
/// * `backend` - The LLM backend to plan with
/// * `query` - The research query
/// * `search_count` - How many searches to ask for
///
/// # Returns
/// * `Ok(SearchPlan)` - A validated plan with at most `search_count` entries
/// * `Err(AppError)` - If the call fails, the JSON is malformed, or the plan
///   is empty
pub async fn plan_searches(
    backend: &dyn LlmBackend,
    query: &str,
    search_count: usize,
) -> Result<SearchPlan, AppError> {
    let prompt = build_planner_prompt(query, search_count);

    tracing::debug!(
        query_len = query.len(),
        search_count = search_count,
        "Calling planner"
    );

    let json_response = backend
        .complete(&prompt, true)
        .await
        .map_err(|e| AppError::PlanningFailed(e.to_string()))?;

    let mut plan: SearchPlan = serde_json::from_str(&json_response).map_err(|e| {
        AppError::InvalidPlan(format!(
            "Failed to parse planner response as JSON: {} - Response: {}",
            e, json_response
        ))
    })?;

    plan.validate()
        .map_err(|validation_error| AppError::InvalidPlan(validation_error))?;

    // The plan bounds the fan-out, so an over-generating model must not be
    // allowed to inflate it. Keep the first `search_count` entries.
    if plan.searches.len() > search_count {
        tracing::warn!(
            planned = plan.searches.len(),
            requested = search_count,
            "Planner returned too many searches, truncating"
        );
        plan.searches.truncate(search_count);
    }

    tracing::debug!(num_searches = plan.searches.len(), "Planner produced plan");

    Ok(plan)
}

/// Build the planning prompt
fn build_planner_prompt(query: &str, search_count: usize) -> String {
    format!(
        r#"You are a research planner. Given a research query, propose a set of web searches to perform to best answer the query. Generate exactly {count} search terms, each with a short reason explaining why it matters for the query.

Output Format (JSON):
{{
  "searches": [
    {{
      "query": "...",
      "reason": "..."
    }}
  ]
}}

Rules:
- The "searches" array must contain exactly {count} entries
- "query" is the web search term to use
- "reason" explains why this search is important for the research query

Research query: "{query}"

Return ONLY valid JSON, no other text."#,
        count = search_count,
        query = query
    )
}
