//! Yandex Cloud foundation model wire models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<CompletionMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f32,
    /// Sent as a string, as the REST API documents int64 fields
    pub max_tokens: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub result: Option<CompletionResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResult {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    pub message: CompletionMessage,
    #[serde(default)]
    pub status: Option<String>,
}

impl CompletionResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .alternatives
            .first()?
            .message
            .text
            .as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub model_uri: String,
    pub generation_options: GenerationOptions,
    pub messages: Vec<ImagePromptMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub seed: String,
    pub mime_type: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatio {
    pub width_ratio: String,
    pub height_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImagePromptMessage {
    pub weight: String,
    pub text: String,
}

/// Long-running operation, returned both on submit and on status checks
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    /// Base64 image bytes
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
