//! Application state management
//!
//! The server holds one `AppState` behind an `Arc<RwLock<_>>`: the current
//! pipeline configuration (updatable via the config endpoint), a shared
//! HTTP client for connection pooling, and credentials loaded from the
//! environment at startup. There is no persistence; a restart starts fresh.

use crate::error::AppError;
use crate::llm::GeminiBackend;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::manager::ResearchManager;
use crate::pipeline::notify::SendGridNotifier;
use std::env;
use std::sync::Arc;

/// Credentials for the external services, loaded from the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Gemini API key (`GEMINI_API_KEY`)
    pub gemini_api_key: Option<String>,
    /// SendGrid API key (`SENDGRID_API_KEY`)
    pub sendgrid_api_key: Option<String>,
    /// Sender address for report emails (`REPORT_FROM_EMAIL`)
    pub report_from_email: Option<String>,
    /// Recipient address for report emails (`REPORT_TO_EMAIL`)
    pub report_to_email: Option<String>,
}

impl Credentials {
    /// Load credentials from environment variables
    ///
    /// Missing variables are left as `None`; the error is raised only when a
    /// pipeline run actually needs the credential.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|value| !value.is_empty());
        Self {
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            sendgrid_api_key: non_empty("SENDGRID_API_KEY"),
            report_from_email: non_empty("REPORT_FROM_EMAIL"),
            report_to_email: non_empty("REPORT_TO_EMAIL"),
        }
    }
}

/// Main application state
pub struct AppState {
    /// Current pipeline configuration
    pipeline: PipelineConfig,
    /// Shared HTTP client (connection pooling across runs)
    http: reqwest::Client,
    /// External-service credentials
    credentials: Credentials,
}

impl AppState {
    /// Create state with default configuration and empty credentials
    pub fn new() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            http: reqwest::Client::new(),
            credentials: Credentials::default(),
        }
    }

    /// Create state with credentials loaded from the environment
    pub fn from_env() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            http: reqwest::Client::new(),
            credentials: Credentials::from_env(),
        }
    }

    /// The current pipeline configuration
    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Replace the pipeline configuration (already validated by the caller)
    pub fn set_pipeline_config(&mut self, config: PipelineConfig) {
        self.pipeline = config;
    }

    /// Build a [`ResearchManager`] from the current configuration
    ///
    /// Fails if required credentials are missing from the environment.
    pub fn research_manager(&self) -> Result<ResearchManager, AppError> {
        let gemini_api_key = self
            .credentials
            .gemini_api_key
            .clone()
            .ok_or_else(|| {
                AppError::MissingCredentials(
                    "GEMINI_API_KEY environment variable is not set or is empty".to_string(),
                )
            })?;

        let backend = GeminiBackend::new(
            self.http.clone(),
            gemini_api_key,
            self.pipeline.gemini_model.clone(),
        );

        let sendgrid_api_key = self
            .credentials
            .sendgrid_api_key
            .clone()
            .ok_or_else(|| {
                AppError::MissingCredentials(
                    "SENDGRID_API_KEY environment variable is not set or is empty".to_string(),
                )
            })?;
        let from_email = self
            .credentials
            .report_from_email
            .clone()
            .ok_or_else(|| {
                AppError::MissingCredentials(
                    "REPORT_FROM_EMAIL environment variable is not set or is empty".to_string(),
                )
            })?;
        let to_email = self.credentials.report_to_email.clone().ok_or_else(|| {
            AppError::MissingCredentials(
                "REPORT_TO_EMAIL environment variable is not set or is empty".to_string(),
            )
        })?;

        let notifier =
            SendGridNotifier::new(self.http.clone(), sendgrid_api_key, from_email, to_email);

        Ok(ResearchManager::new(
            Arc::new(backend),
            Arc::new(notifier),
            self.pipeline.clone(),
        ))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
