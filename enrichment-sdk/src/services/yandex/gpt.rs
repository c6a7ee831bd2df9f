use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::models::{CompletionMessage, CompletionOptions, CompletionRequest, CompletionResponse};
use super::api_key_header;
use crate::config::YandexConfig;
use crate::core::{ProviderId, TextLookup};
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, ContentQuery, ProviderCredential, RawProviderResponse};
use crate::services::common::{build_http_client, execute_json};
use crate::services::content_search_prompt;

/// YandexGPT Lite text lookup adapter
pub struct YandexGptLookup {
    http_client: Client,
    config: YandexConfig,
    credential: ProviderCredential,
}

impl YandexGptLookup {
    pub fn new(config: YandexConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }
}

#[async_trait]
impl TextLookup for YandexGptLookup {
    fn provider(&self) -> ProviderId {
        ProviderId::YandexGpt
    }

    async fn lookup(
        &self,
        query: &ContentQuery,
        _token: Option<&AccessToken>,
    ) -> Result<RawProviderResponse> {
        let endpoint = format!("{}/foundationModels/v1/completion", self.config.base_url);
        let body = CompletionRequest {
            model_uri: self.config.gpt_model_uri(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: 0.6,
                max_tokens: "2000".to_string(),
            },
            messages: vec![CompletionMessage {
                role: "user".to_string(),
                text: Some(content_search_prompt(query.text())),
            }],
        };

        let request = self
            .http_client
            .post(&endpoint)
            .header(reqwest::header::AUTHORIZATION, api_key_header(&self.credential))
            .header("x-folder-id", &self.config.folder_id)
            .json(&body);

        let response: CompletionResponse =
            execute_json(ProviderId::YandexGpt, &endpoint, request).await?;

        let text = response.first_text().ok_or_else(|| {
            ServiceError::malformed(
                ProviderId::YandexGpt,
                "Response has no result.alternatives[0].message.text",
            )
            .at_endpoint(&endpoint)
        })?;

        Ok(RawProviderResponse::new(ProviderId::YandexGpt, text))
    }
}
