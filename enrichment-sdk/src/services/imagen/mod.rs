//! Google Imagen poster adapter

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ImagenConfig;
use crate::core::{GenerationOutcome, ImageGenerate, ProviderId};
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, ProviderCredential};
use crate::services::common::{build_http_client, decode_image, execute_json};

pub struct ImagenGenerator {
    http_client: Client,
    config: ImagenConfig,
    credential: ProviderCredential,
}

impl ImagenGenerator {
    pub fn new(config: ImagenConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }
}

#[async_trait]
impl ImageGenerate for ImagenGenerator {
    fn provider(&self) -> ProviderId {
        ProviderId::Imagen
    }

    async fn generate(
        &self,
        prompt: &str,
        _token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome> {
        let endpoint = format!(
            "{}/v1beta/models/{}:predict",
            self.config.base_url, self.config.model
        );
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: self.config.aspect_ratio.clone(),
            },
        };

        let request = self
            .http_client
            .post(&endpoint)
            .header("x-goog-api-key", self.credential.expose_secret())
            .json(&body);

        let response: PredictResponse = execute_json(ProviderId::Imagen, &endpoint, request).await?;

        let prediction = response.predictions.into_iter().next().ok_or_else(|| {
            // Imagen drops predictions that trip its safety filter
            ServiceError::malformed(ProviderId::Imagen, "Response has no predictions")
                .at_endpoint(&endpoint)
        })?;

        let payload = prediction
            .bytes_base64_encoded
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ServiceError::malformed(
                    ProviderId::Imagen,
                    "predictions[0] has no bytesBase64Encoded",
                )
                .at_endpoint(&endpoint)
            })?;

        let mime_type = prediction.mime_type.unwrap_or_else(|| "image/png".to_string());
        let image = decode_image(ProviderId::Imagen, &endpoint, mime_type, payload)?;
        Ok(GenerationOutcome::Sync(image))
    }
}
