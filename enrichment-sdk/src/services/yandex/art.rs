use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::api_key_header;
use super::models::{AspectRatio, GenerationOptions, ImageGenerationRequest, ImagePromptMessage, Operation};
use crate::config::YandexConfig;
use crate::core::{keyword_prompt, GenerationOutcome, ImageGenerate, PollStatus, ProviderId};
use crate::error::{Result, ServiceError, UpstreamFailure};
use crate::models::{AccessToken, AsyncHandle, PosterRequest, ProviderCredential};
use crate::services::common::{build_http_client, decode_image, execute_json};

const ART_MIME_TYPE: &str = "image/jpeg";

/// YandexART poster adapter; the only provider that answers with a job
pub struct YandexArtGenerator {
    http_client: Client,
    config: YandexConfig,
    credential: ProviderCredential,
}

impl YandexArtGenerator {
    pub fn new(config: YandexConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }

    fn seed() -> String {
        (chrono::Utc::now().timestamp_subsec_nanos() % 1_000_000).to_string()
    }
}

#[async_trait]
impl ImageGenerate for YandexArtGenerator {
    fn provider(&self) -> ProviderId {
        ProviderId::YandexArt
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
            "{}/foundationModels/v1/imageGenerationAsync",
            self.config.base_url
        );
        let body = ImageGenerationRequest {
            model_uri: self.config.art_model_uri(),
            generation_options: GenerationOptions {
                seed: Self::seed(),
                mime_type: ART_MIME_TYPE.to_string(),
                aspect_ratio: AspectRatio {
                    width_ratio: "2".to_string(),
                    height_ratio: "3".to_string(),
                },
            },
            messages: vec![ImagePromptMessage {
                weight: "1".to_string(),
                text: prompt.to_string(),
            }],
        };

        let request = self
            .http_client
            .post(&endpoint)
            .header(reqwest::header::AUTHORIZATION, api_key_header(&self.credential))
            .json(&body);

        let operation: Operation = execute_json(ProviderId::YandexArt, &endpoint, request).await?;

        let job_id = operation.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ServiceError::malformed(ProviderId::YandexArt, "Submit response has no operation id")
                .at_endpoint(&endpoint)
        })?;

        log::info!("YandexART accepted generation job {}", job_id);
        Ok(GenerationOutcome::Async(AsyncHandle {
            provider: ProviderId::YandexArt,
            job_id,
        }))
    }

    async fn check_status(
        &self,
        handle: &AsyncHandle,
        _token: Option<&AccessToken>,
    ) -> Result<PollStatus> {
        let endpoint = format!("{}/operations/{}", self.config.operations_url, handle.job_id);

        let request = self
            .http_client
            .get(&endpoint)
            .header(reqwest::header::AUTHORIZATION, api_key_header(&self.credential));

        let operation: Operation = execute_json(ProviderId::YandexArt, &endpoint, request).await?;

        if !operation.done {
            return Ok(PollStatus::Pending);
        }

        if let Some(error) = operation.error {
            return Err(ServiceError::upstream(
                ProviderId::YandexArt,
                UpstreamFailure::JobFailed,
                format!(
                    "Job {} failed: {}",
                    handle.job_id,
                    error.message.unwrap_or_else(|| "unknown error".to_string())
                ),
            )
            .at_endpoint(&endpoint));
        }

        let image = operation
            .response
            .and_then(|r| r.image)
            .filter(|image| !image.is_empty())
            .map(|image| decode_image(ProviderId::YandexArt, &endpoint, ART_MIME_TYPE, image))
            .transpose()?;

        Ok(PollStatus::Done(image))
    }
}
