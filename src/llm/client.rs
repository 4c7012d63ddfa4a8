//! Gemini API client
//!
//! Direct HTTP client for calling the Gemini `generateContent` endpoint.
//! The planner and writer stages use JSON mode to get structured output;
//! the search stage uses plain text mode.

use crate::error::AppError;
use crate::llm::types::{GenerateRequest, GenerateResponse};
use anyhow::anyhow;

/// Default Gemini API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Call the Gemini API with a prompt and return the response text
///
/// Takes an explicit base URL so tests can point the client at a mock server.
///
/// # Arguments
/// * `client` - Shared HTTP client (connection pooling)
/// * `base_url` - API base URL (production: [`GEMINI_API_BASE_URL`])
/// * `api_key` - Gemini API key
/// * `model` - Model name (e.g., "gemini-2.5-flash")
/// * `prompt` - The prompt to send
/// * `force_json` - If true, request JSON response format
///
/// # Returns
/// * `Ok(String)` - The text content from the API response
/// * `Err(AppError)` - If the API call failed, the prompt was blocked, or the
///   response contained no text
pub async fn generate_content(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    force_json: bool,
) -> Result<String, AppError> {
    if api_key.is_empty() {
        return Err(AppError::MissingCredentials(
            "Gemini API key is empty".to_string(),
        ));
    }

    let url = format!(
        "{}/models/{}:generateContent?key={}",
        base_url, model, api_key
    );
    let request_body = GenerateRequest::from_prompt(prompt, force_json);

    tracing::debug!(
        model = %model,
        force_json = force_json,
        prompt_len = prompt.len(),
        "Calling Gemini API"
    );

    let response = client
        .post(&url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| {
            AppError::Internal(anyhow!("Failed to send HTTP request to Gemini API: {}", e))
        })?;

    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        tracing::error!(
            status_code = status_code,
            error_body = %error_body,
            "Gemini API returned error status"
        );

        if status_code == 429 {
            return Err(AppError::Internal(anyhow!(
                "Gemini API rate limit exceeded (HTTP {}): {}",
                status_code,
                error_body
            )));
        }

        return Err(AppError::Internal(anyhow!(
            "Gemini API returned error status {}: {}",
            status_code,
            error_body
        )));
    }

    let response_body = response.text().await.map_err(|e| {
        AppError::Internal(anyhow!(
            "Failed to read response body from Gemini API: {}",
            e
        ))
    })?;

    let parsed: GenerateResponse = serde_json::from_str(&response_body).map_err(|e| {
        AppError::Internal(anyhow!(
            "Failed to parse JSON response from Gemini API: {} - Response body: {}",
            e,
            response_body
        ))
    })?;

    if let Some(feedback) = &parsed.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(AppError::Internal(anyhow!(
                "Gemini API blocked the prompt: {}",
                reason
            )));
        }
    }

    let text = parsed
        .first_text()
        .ok_or_else(|| AppError::Internal(anyhow!("Gemini API response contains no text")))?;
    if text.is_empty() {
        return Err(AppError::Internal(anyhow!(
            "Gemini API response text is empty"
        )));
    }

    tracing::debug!(
        response_len = text.len(),
        "Successfully received response from Gemini API"
    );

    Ok(text.to_string())
}
