//! OpenAI DALL-E poster adapter

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::OpenAIImageConfig;
use crate::core::{GenerationOutcome, ImageGenerate, ProviderId};
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, PosterImage, ProviderCredential};
use crate::services::common::{build_http_client, decode_image, execute_json};

const OPENAI_MIME_TYPE: &str = "image/png";

pub struct OpenAIImageGenerator {
    http_client: Client,
    config: OpenAIImageConfig,
    credential: ProviderCredential,
}

impl OpenAIImageGenerator {
    pub fn new(
        config: OpenAIImageConfig,
        credential: ProviderCredential,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }
}

#[async_trait]
impl ImageGenerate for OpenAIImageGenerator {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    async fn generate(
        &self,
        prompt: &str,
        _token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome> {
        let endpoint = format!("{}/images/generations", self.config.base_url);
        let body = ImageGenerationRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            size: self.config.size.clone(),
            quality: self.config.quality.clone(),
            n: 1,
        };

        let request = self
            .http_client
            .post(&endpoint)
            .bearer_auth(self.credential.expose_secret())
            .json(&body);

        let response: ImageGenerationResponse =
            execute_json(ProviderId::OpenAI, &endpoint, request).await?;

        let data = response.data.into_iter().next().ok_or_else(|| {
            ServiceError::malformed(ProviderId::OpenAI, "Response has no data[0]").at_endpoint(&endpoint)
        })?;

        if let Some(revised) = data.revised_prompt.as_deref() {
            log::debug!("OpenAI revised poster prompt: {}", revised);
        }

        let image = match (data.url, data.b64_json) {
            (Some(url), _) if !url.is_empty() => PosterImage::url(OPENAI_MIME_TYPE, url),
            (_, Some(b64)) if !b64.is_empty() => {
                decode_image(ProviderId::OpenAI, &endpoint, OPENAI_MIME_TYPE, b64)?
            }
            _ => {
                return Err(ServiceError::malformed(
                    ProviderId::OpenAI,
                    "data[0] has neither url nor b64_json",
                )
                .at_endpoint(&endpoint))
            }
        };

        Ok(GenerationOutcome::Sync(image))
    }
}
