//! Synthesizing stage
//!
//! Turns the original query plus the aggregated search summaries into a
//! structured report via a single JSON-mode model call. The summary list may
//! be empty (all searches failed); the stage still runs and the prompt says
//! so. A failure here is fatal: there is no unit to drop.

use crate::error::AppError;
use crate::llm::LlmBackend;
use crate::pipeline::types::ReportData;

/// Write the final report for a research query
///
/// # Arguments
/// * `backend` - The LLM backend to synthesize with
/// * `query` - The original research query
/// * `summaries` - Aggregated search summaries (possibly empty)
///
/// # Returns
/// * `Ok(ReportData)` - The synthesized report
/// * `Err(AppError)` - If the call fails or the JSON is malformed
pub async fn write_report(
    backend: &dyn LlmBackend,
    query: &str,
    summaries: &[String],
) -> Result<ReportData, AppError> {
    let prompt = build_writer_prompt(query, summaries);

    tracing::debug!(
        query_len = query.len(),
        num_summaries = summaries.len(),
        "Calling writer"
    );

    let json_response = backend
        .complete(&prompt, true)
        .await
        .map_err(|e| AppError::SynthesisFailed(e.to_string()))?;

    let report: ReportData = serde_json::from_str(&json_response).map_err(|e| {
        AppError::SynthesisFailed(format!(
            "Failed to parse writer response as JSON: {} - Response: {}",
            e, json_response
        ))
    })?;

    tracing::debug!(
        report_len = report.markdown_report.len(),
        follow_ups = report.follow_up_questions.len(),
        "Writer produced report"
    );

    Ok(report)
}

/// Build the synthesis prompt
fn build_writer_prompt(query: &str, summaries: &[String]) -> String {
    let summaries_block = if summaries.is_empty() {
        "No search summaries are available; write the best report you can from the query alone \
         and note the missing research."
            .to_string()
    } else {
        summaries
            .iter()
            .enumerate()
            .map(|(idx, summary)| format!("Summary {}:\n{}", idx + 1, summary))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"You are a senior researcher tasked with writing a cohesive report for a research query. You are given the original query and a set of initial search summaries gathered by a research assistant. First plan the structure and flow of the report, then generate it. The report must be in markdown, long-form and detailed, aiming for 1000+ words.

Output Format (JSON):
{{
  "short_summary": "2-3 sentence summary of the findings",
  "markdown_report": "the full report in markdown",
  "follow_up_questions": ["suggested topics to research further"]
}}

Research query: "{query}"

{summaries}

Return ONLY valid JSON, no other text."#,
        query = query,
        summaries = summaries_block
    )
}
