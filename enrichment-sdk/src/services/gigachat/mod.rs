//! Sber GigaChat text lookup adapter
//!
//! GigaChat requires a bearer token from its OAuth endpoint; the token is
//! supplied by the orchestrator through the `TokenManager`.

mod models;
pub mod oauth;

pub use models::*;
pub use oauth::GigaChatTokenExchange;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GigaChatConfig;
use crate::core::{ProviderId, TextLookup};
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, ContentQuery, RawProviderResponse};
use crate::services::common::{build_http_client, execute_json};
use crate::services::content_search_prompt;

pub struct GigaChatLookup {
    http_client: Client,
    config: GigaChatConfig,
}

impl GigaChatLookup {
    pub fn new(config: GigaChatConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, config.accept_invalid_certs)?,
            config,
        })
    }
}

#[async_trait]
impl TextLookup for GigaChatLookup {
    fn provider(&self) -> ProviderId {
        ProviderId::GigaChat
    }

    async fn lookup(
        &self,
        query: &ContentQuery,
        token: Option<&AccessToken>,
    ) -> Result<RawProviderResponse> {
        let token = token.ok_or_else(|| {
            ServiceError::authentication(ProviderId::GigaChat, "Access token is required")
        })?;

        let endpoint = format!("{}/api/v1/chat/completions", self.config.base_url);
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(content_search_prompt(query.text()))],
            temperature: 0.7,
            max_tokens: self.config.max_tokens,
        };

        let request = self
            .http_client
            .post(&endpoint)
            .bearer_auth(token.value())
            .json(&body);

        let response: ChatCompletionResponse =
            execute_json(ProviderId::GigaChat, &endpoint, request).await?;

        let text = response.first_content().ok_or_else(|| {
            ServiceError::malformed(ProviderId::GigaChat, "Response has no choices[0].message.content")
                .at_endpoint(&endpoint)
        })?;

        Ok(RawProviderResponse::new(ProviderId::GigaChat, text))
    }
}
