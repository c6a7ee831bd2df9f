//! Stability AI (SDXL) poster adapter

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::StabilityConfig;
use crate::core::{keyword_prompt, GenerationOutcome, ImageGenerate, ProviderId};
use crate::error::{Result, ServiceError, UpstreamFailure};
use crate::models::{AccessToken, PosterRequest, ProviderCredential};
use crate::services::common::{build_http_client, decode_image, execute_json};

pub struct StabilityImageGenerator {
    http_client: Client,
    config: StabilityConfig,
    credential: ProviderCredential,
}

impl StabilityImageGenerator {
    pub fn new(config: StabilityConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }
}

#[async_trait]
impl ImageGenerate for StabilityImageGenerator {
    fn provider(&self) -> ProviderId {
        ProviderId::Stability
    }

    fn synthesize_prompt(&self, request: &PosterRequest) -> String {
        keyword_prompt(request)
    }

    async fn generate(
        &self,
        prompt: &str,
        _token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome> {
        let endpoint = format!(
            "{}/v1/generation/{}/text-to-image",
            self.config.base_url, self.config.engine
        );
        // 768x1344 is the SDXL portrait size closest to a 9:16 poster
        let body = TextToImageRequest {
            text_prompts: vec![TextPrompt {
                text: prompt.to_string(),
                weight: 1.0,
            }],
            cfg_scale: 7,
            height: 1344,
            width: 768,
            samples: 1,
            steps: 30,
        };

        let request = self
            .http_client
            .post(&endpoint)
            .bearer_auth(self.credential.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);

        let response: TextToImageResponse =
            execute_json(ProviderId::Stability, &endpoint, request).await?;

        let artifact = response.artifacts.into_iter().next().ok_or_else(|| {
            ServiceError::malformed(ProviderId::Stability, "Response has no artifacts")
                .at_endpoint(&endpoint)
        })?;

        if artifact.finish_reason.as_deref() == Some("ERROR") {
            return Err(ServiceError::upstream(
                ProviderId::Stability,
                UpstreamFailure::JobFailed,
                "Generation finished with ERROR",
            )
            .at_endpoint(&endpoint));
        }

        let payload = artifact.base64.filter(|b| !b.is_empty()).ok_or_else(|| {
            ServiceError::malformed(ProviderId::Stability, "artifacts[0] has no base64 payload")
                .at_endpoint(&endpoint)
        })?;

        let image = decode_image(ProviderId::Stability, &endpoint, "image/png", payload)?;
        Ok(GenerationOutcome::Sync(image))
    }
}
