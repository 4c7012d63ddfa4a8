//! Pipeline configuration
//!
//! Centralized configuration for pipeline components. Constructed once and
//! passed into each stage; there is no ambient global state.

use crate::error::AppError;
use crate::pipeline::constants::{
    DEFAULT_MAX_CONCURRENT_SEARCHES, DEFAULT_MAX_QUERY_LENGTH, DEFAULT_PIPELINE_TIMEOUT_SECS,
    DEFAULT_SEARCH_COUNT, DEFAULT_SEARCH_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

/// What to do when report delivery fails after a successful synthesis
///
/// The default is `Surface`: the safer choice, since a swallowed delivery
/// failure is invisible to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyFailurePolicy {
    /// Emit a terminal error event and fail the run
    Surface,
    /// Log, emit a non-fatal event, and still end the stream with the report
    Swallow,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Number of searches the planner is asked to produce
    pub search_count: usize,
    /// Maximum number of searches in flight at once
    pub max_concurrent_searches: usize,
    /// Per-search timeout in seconds
    pub search_timeout_secs: u64,
    /// Overall pipeline deadline in seconds
    pub pipeline_timeout_secs: u64,
    /// Gemini model name
    pub gemini_model: String,
    /// Maximum research query length in characters
    pub max_query_length: usize,
    /// Policy applied when report delivery fails
    pub on_notify_failure: NotifyFailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_count: DEFAULT_SEARCH_COUNT,
            max_concurrent_searches: DEFAULT_MAX_CONCURRENT_SEARCHES,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            pipeline_timeout_secs: DEFAULT_PIPELINE_TIMEOUT_SECS,
            gemini_model: "gemini-2.5-flash".to_string(),
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            on_notify_failure: NotifyFailurePolicy::Surface,
        }
    }
}

/// Request body for updating pipeline configuration
#[derive(Debug, Deserialize)]
pub struct ConfigUpdateRequest {
    /// Number of searches to plan (optional)
    pub search_count: Option<usize>,
    /// Maximum number of searches in flight (optional)
    pub max_concurrent_searches: Option<usize>,
    /// Per-search timeout in seconds (optional)
    pub search_timeout_secs: Option<u64>,
    /// Overall pipeline deadline in seconds (optional)
    pub pipeline_timeout_secs: Option<u64>,
    /// Gemini model name (optional)
    pub gemini_model: Option<String>,
    /// Maximum query length in characters (optional)
    pub max_query_length: Option<usize>,
    /// Notification failure policy (optional)
    pub on_notify_failure: Option<NotifyFailurePolicy>,
}

/// Validate and apply configuration updates
///
/// Validates the update request and applies valid changes to the config.
/// Returns an error if any validation fails.
///
/// # Arguments
/// * `config` - The current config to update
/// * `request` - The update request with optional fields
///
/// # Returns
/// * `Ok(PipelineConfig)` - The updated configuration
/// * `Err(AppError)` - If validation fails
pub fn validate_and_apply_config_update(
    mut config: PipelineConfig,
    request: ConfigUpdateRequest,
) -> Result<PipelineConfig, AppError> {
    if let Some(count) = request.search_count {
        if count == 0 {
            return Err(AppError::InvalidConfig(
                "search_count must be > 0".to_string(),
            ));
        }
        config.search_count = count;
    }

    if let Some(max_concurrent) = request.max_concurrent_searches {
        if max_concurrent == 0 {
            return Err(AppError::InvalidConfig(
                "max_concurrent_searches must be > 0".to_string(),
            ));
        }
        config.max_concurrent_searches = max_concurrent;
    }

    if let Some(timeout) = request.search_timeout_secs {
        if timeout == 0 {
            return Err(AppError::InvalidConfig(
                "search_timeout_secs must be > 0".to_string(),
            ));
        }
        config.search_timeout_secs = timeout;
    }

    if let Some(timeout) = request.pipeline_timeout_secs {
        if timeout == 0 {
            return Err(AppError::InvalidConfig(
                "pipeline_timeout_secs must be > 0".to_string(),
            ));
        }
        config.pipeline_timeout_secs = timeout;
    }

    if let Some(model) = request.gemini_model {
        if model.is_empty() {
            return Err(AppError::InvalidConfig(
                "gemini_model cannot be empty".to_string(),
            ));
        }
        config.gemini_model = model;
    }

    if let Some(max_len) = request.max_query_length {
        if max_len == 0 {
            return Err(AppError::InvalidConfig(
                "max_query_length must be > 0".to_string(),
            ));
        }
        config.max_query_length = max_len;
    }

    if let Some(policy) = request.on_notify_failure {
        config.on_notify_failure = policy;
    }

    Ok(config)
}
