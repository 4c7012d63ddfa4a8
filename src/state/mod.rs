// State management module
// Holds the shared pipeline configuration, HTTP client, and credentials

pub mod app_state;

pub use app_state::{AppState, Credentials};
