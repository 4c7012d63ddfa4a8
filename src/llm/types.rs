//! Gemini API wire types
//!
//! Structs that mirror the Gemini `generateContent` JSON request and response
//! formats. Only the fields the client actually reads are modeled.

use serde::{Deserialize, Serialize};

/// Request body for a `generateContent` call
#[derive(Serialize, Debug)]
pub struct GenerateRequest {
    /// Content items to send (a single user turn for this client)
    pub contents: Vec<RequestContent>,
    /// Optional generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// Build a single-turn request from a prompt, optionally forcing JSON output
    pub fn from_prompt(prompt: &str, force_json: bool) -> Self {
        let generation_config = force_json.then(|| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
        });
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

/// Content structure for requests
#[derive(Serialize, Debug)]
pub struct RequestContent {
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

/// A single text part for requests
#[derive(Serialize, Debug)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}

/// Generation configuration for requests
#[derive(Serialize, Debug)]
pub struct GenerationConfig {
    /// MIME type to force for the response (e.g., "application/json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

/// Top-level `generateContent` response
#[derive(Deserialize, Debug)]
pub struct GenerateResponse {
    /// Candidate responses from the model
    pub candidates: Vec<Candidate>,
    /// Feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateResponse {
    /// Extract the text of the first candidate's first part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
pub struct Candidate {
    /// The content of this candidate
    pub content: ResponseContent,
}

/// Content structure of a candidate
#[derive(Deserialize, Debug)]
pub struct ResponseContent {
    /// Content parts (typically one text part)
    pub parts: Vec<ResponsePart>,
}

/// A single text part of a candidate
#[derive(Deserialize, Debug)]
pub struct ResponsePart {
    /// The text content of this part
    pub text: String,
}

/// Feedback about the prompt
#[derive(Deserialize, Debug)]
pub struct PromptFeedback {
    /// Reason the prompt was blocked, if it was
    #[serde(default)]
    pub block_reason: Option<String>,
}
