//! Deep Research Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
/// Application state management
///
/// Holds the pipeline configuration, shared HTTP client, and credentials.
pub mod state;
