//! LLM backend abstraction and Gemini implementation
//!
//! The pipeline stages call the model through the [`LlmBackend`] trait so
//! they can be exercised with fakes in tests. The production implementation
//! is [`GeminiBackend`], a thin wrapper over the HTTP client in [`client`].

pub mod client;
pub mod types;

use crate::error::AppError;
use async_trait::async_trait;

/// An opaque remote completion service
///
/// `force_json` requests structured JSON output (used by the planner and
/// writer stages); plain text otherwise.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Run a single completion and return the response text
    async fn complete(&self, prompt: &str, force_json: bool) -> Result<String, AppError>;
}

/// Gemini-backed implementation of [`LlmBackend`]
#[derive(Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a backend against the production Gemini endpoint
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url: client::GEMINI_API_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Override the API base URL (tests point this at a mock server)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, prompt: &str, force_json: bool) -> Result<String, AppError> {
        client::generate_content(
            &self.http,
            &self.base_url,
            &self.api_key,
            &self.model,
            prompt,
            force_json,
        )
        .await
    }
}
