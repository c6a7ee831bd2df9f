//! Stability AI v1 text-to-image wire models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TextToImageRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: u32,
    pub height: u32,
    pub width: u32,
    pub samples: u32,
    pub steps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextToImageResponse {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}
