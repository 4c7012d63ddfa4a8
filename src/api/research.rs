//! Research API handlers
//!
//! `POST /api/research` starts a pipeline run and streams its progress to
//! the caller over SSE (Server-Sent Events). Each event is one JSON-encoded
//! `ProgressEvent`; the stream is terminated with the `[DONE]` marker. A
//! caller that disconnects mid-stream loses context and must start a fresh
//! run; there is no checkpointing.
//!
//! `GET`/`POST /api/config` expose the pipeline configuration.

use crate::error::AppError;
use crate::pipeline::config::{
    validate_and_apply_config_update, ConfigUpdateRequest, PipelineConfig,
};
use crate::pipeline::constants::{SSE_DONE_SIGNAL, SSE_ERROR_PREFIX};
use crate::pipeline::events::ProgressEvent;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Capacity of the progress channel between pipeline and SSE bridge
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Research request
#[derive(Deserialize, Debug)]
pub struct ResearchRequest {
    /// The research query to investigate
    pub query: String,
}

/// Helper function to format a stream into SSE (Server-Sent Events) format
///
/// Takes a stream of `Result<String, axum::Error>` and converts it to SSE
/// format where each item is framed as "data: <content>\n\n"
fn format_sse_stream(
    stream: impl futures_util::Stream<Item = Result<String, axum::Error>> + Send + 'static,
) -> impl futures_util::Stream<Item = Result<String, std::io::Error>> {
    stream.map(|event_result| {
        let sse_text = match event_result {
            Ok(data) => format!("data: {}\n\n", data),
            Err(e) => format!("data: {} {}\n\n", SSE_ERROR_PREFIX, e),
        };
        Ok::<_, std::io::Error>(sse_text)
    })
}

/// POST /api/research - Run a research pipeline, streaming progress via SSE
///
/// # Flow
/// 1. Validate the query against the configured maximum length
/// 2. Build a `ResearchManager` from the current state (fails fast if
///    credentials are missing)
/// 3. Spawn the pipeline and bridge its progress channel onto the response
///
/// # Returns
/// * `Ok(Response)` - SSE stream of progress events, `[DONE]`-terminated
/// * `Err(AppError)` - If validation or manager construction fails
pub async fn run_research(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<ResearchRequest>,
) -> Result<Response, AppError> {
    use async_stream::stream;

    let manager = {
        let state_read = state.read().await;
        let max_query_length = state_read.pipeline_config().max_query_length;

        if request.query.trim().is_empty() {
            return Err(AppError::InvalidRequest("query is empty".to_string()));
        }
        if request.query.len() > max_query_length {
            return Err(AppError::InvalidRequest(format!(
                "query too long ({} > {} characters)",
                request.query.len(),
                max_query_length
            )));
        }

        state_read.research_manager()?
    };

    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(PROGRESS_CHANNEL_CAPACITY);
    let query = request.query;

    tokio::spawn(async move {
        // Fatal errors were already pushed onto the stream as Error events.
        if let Err(error) = manager.run(&query, tx).await {
            tracing::error!(error = %error, "Research pipeline run failed");
        }
    });

    let stream = stream! {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => yield Ok::<String, axum::Error>(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize progress event");
                }
            }
        }
        yield Ok::<String, axum::Error>(SSE_DONE_SIGNAL.to_string());
    };

    let sse_stream = format_sse_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

/// GET /api/config - Return the current pipeline configuration
pub async fn get_config(
    State(state): State<Arc<RwLock<AppState>>>,
) -> Json<PipelineConfig> {
    let state_read = state.read().await;
    Json(state_read.pipeline_config().clone())
}

/// POST /api/config - Validate and apply a configuration update
///
/// # Returns
/// * `Ok(Json<PipelineConfig>)` - The updated configuration
/// * `Err(AppError)` - If any field fails validation (nothing is applied)
pub async fn update_config(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<ConfigUpdateRequest>,
) -> Result<Json<PipelineConfig>, AppError> {
    let mut state_write = state.write().await;
    let updated = validate_and_apply_config_update(state_write.pipeline_config().clone(), request)?;
    state_write.set_pipeline_config(updated.clone());

    tracing::info!(
        search_count = updated.search_count,
        max_concurrent_searches = updated.max_concurrent_searches,
        "Pipeline configuration updated"
    );

    Ok(Json(updated))
}
