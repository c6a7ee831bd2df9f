//! Google Gemini text lookup adapter

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GeminiConfig;
use crate::core::{ProviderId, TextLookup};
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, ContentQuery, ProviderCredential, RawProviderResponse};
use crate::services::common::{build_http_client, execute_json};
use crate::services::content_search_prompt;

pub struct GeminiLookup {
    http_client: Client,
    config: GeminiConfig,
    credential: ProviderCredential,
}

impl GeminiLookup {
    pub fn new(config: GeminiConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, false)?,
            config,
            credential,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl TextLookup for GeminiLookup {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn lookup(
        &self,
        query: &ContentQuery,
        _token: Option<&AccessToken>,
    ) -> Result<RawProviderResponse> {
        let endpoint = self.endpoint();
        let body = GenerateContentRequest::from_text(content_search_prompt(query.text()));

        let request = self
            .http_client
            .post(&endpoint)
            .header("x-goog-api-key", self.credential.expose_secret())
            .json(&body);

        let response: GenerateContentResponse =
            execute_json(ProviderId::Gemini, &endpoint, request).await?;

        let text = response.first_text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            ServiceError::malformed(
                ProviderId::Gemini,
                format!("Response has no text part ({})", reason),
            )
            .at_endpoint(&endpoint)
        })?;

        Ok(RawProviderResponse::new(ProviderId::Gemini, text))
    }
}
