//! Text lookup orchestration

use std::sync::Arc;

use super::with_access_token;
use crate::auth::TokenManager;
use crate::core::{ProviderId, TextLookup};
use crate::error::{Result, ServiceError};
use crate::models::{ContentQuery, ContentResult};
use crate::normalizer::ResponseNormalizer;

/// Resolves a free-text query with the configured text provider
///
/// Only the primary provider is used unless a fallback chain is set with
/// `with_fallbacks`. A fallback is tried after an upstream or
/// authentication failure, never after a not-found or validation result.
pub struct TextSearchOrchestrator {
    primary: Arc<dyn TextLookup>,
    fallbacks: Vec<Arc<dyn TextLookup>>,
    tokens: Arc<TokenManager>,
    normalizer: ResponseNormalizer,
}

impl TextSearchOrchestrator {
    pub fn new(primary: Arc<dyn TextLookup>, tokens: Arc<TokenManager>) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
            tokens,
            normalizer: ResponseNormalizer::new(),
        }
    }

    /// Opt into trying further providers after a provider failure
    pub fn with_fallbacks(mut self, fallbacks: Vec<Arc<dyn TextLookup>>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Primary provider followed by fallbacks, in order
    pub fn providers(&self) -> Vec<ProviderId> {
        std::iter::once(&self.primary)
            .chain(self.fallbacks.iter())
            .map(|adapter| adapter.provider())
            .collect()
    }

    pub async fn resolve(&self, query: &ContentQuery) -> Result<ContentResult> {
        let chain: Vec<&Arc<dyn TextLookup>> =
            std::iter::once(&self.primary).chain(self.fallbacks.iter()).collect();
        let last = chain.len() - 1;

        for (index, adapter) in chain.into_iter().enumerate() {
            match self.resolve_with(adapter.as_ref(), query).await {
                Err(e) if e.is_provider_failure() && index < last => {
                    log::warn!(
                        "Text lookup via {} failed ({}), falling back",
                        adapter.provider(),
                        e
                    );
                }
                result => return result,
            }
        }

        // every iteration either returns or continues to a later adapter
        Err(ServiceError::configuration("No text provider configured"))
    }

    async fn resolve_with(&self, adapter: &dyn TextLookup, query: &ContentQuery) -> Result<ContentResult> {
        let provider = adapter.provider();
        log::debug!("Looking up '{}' via {}", query.text(), provider);

        let raw = with_access_token(&self.tokens, provider, |token| async move {
            adapter.lookup(query, token.as_ref()).await
        })
        .await?;

        match self.normalizer.normalize(&raw)? {
            Some(result) => {
                log::info!(
                    "{} resolved '{}' to '{}' ({}, {})",
                    provider,
                    query.text(),
                    result.title,
                    result.content_type,
                    result.year
                );
                Ok(result)
            }
            None => {
                log::info!("{} found nothing for '{}'", provider, query.text());
                Err(ServiceError::not_found(format!(
                    "Content not found: {}",
                    query.text()
                )))
            }
        }
    }
}
