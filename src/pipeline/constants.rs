//! Pipeline constants
//!
//! Centralized constants used throughout the pipeline module.

/// SSE stream termination signal
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

/// SSE error prefix
pub const SSE_ERROR_PREFIX: &str = "[ERROR]";

/// Default number of searches the planner is asked for
pub const DEFAULT_SEARCH_COUNT: usize = 3;

/// Default maximum number of searches in flight at once
pub const DEFAULT_MAX_CONCURRENT_SEARCHES: usize = 10;

/// Default per-search timeout in seconds
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;

/// Default overall pipeline deadline in seconds
pub const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 300;

/// Default maximum research query length in characters
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 10000;
