//! Startup wiring from configuration

use std::sync::Arc;

use super::image::ImageGenerationOrchestrator;
use super::polling::PollPolicy;
use super::text::TextSearchOrchestrator;
use crate::auth::TokenManager;
use crate::config::{ConfigProvider, EnrichmentConfig};
use crate::core::{Clock, SystemClock};
use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::services::{build_image_adapter, build_text_adapter, build_token_exchangers};

/// Fully wired orchestration layer
pub struct Enrichment {
    pub config: EnrichmentConfig,
    pub tokens: Arc<TokenManager>,
    pub text: Arc<TextSearchOrchestrator>,
    pub images: Arc<ImageGenerationOrchestrator>,
}

impl Enrichment {
    /// Resolve credentials, adapters and orchestrators
    ///
    /// A selected provider without its credential fails here with
    /// `MissingCredential` instead of at the first request.
    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &dyn ConfigProvider, clock: Arc<dyn Clock>) -> Result<Self> {
        let settings = EnrichmentConfig::from_provider(config)?;
        let credentials = CredentialStore::from_provider(config);
        let timeout = settings.request_timeout();

        let text_chain = settings.text_chain();
        let mut all_providers = text_chain.clone();
        all_providers.push(settings.image_provider);

        let tokens = Arc::new(
            TokenManager::new(build_token_exchangers(
                &all_providers,
                config,
                &credentials,
                timeout,
            )?)
            .with_clock(clock.clone())
            .with_refresh_margin(settings.token_refresh_margin()),
        );

        let primary = build_text_adapter(settings.text_provider, config, &credentials, timeout)?;
        let fallbacks = settings
            .text_fallbacks
            .iter()
            .map(|&provider| build_text_adapter(provider, config, &credentials, timeout))
            .collect::<Result<Vec<_>>>()?;

        let text = TextSearchOrchestrator::new(primary, tokens.clone()).with_fallbacks(fallbacks);

        let image_adapter =
            build_image_adapter(settings.image_provider, config, &credentials, timeout)?;
        let images = ImageGenerationOrchestrator::new(image_adapter, tokens.clone())
            .with_clock(clock)
            .with_poll_policy(PollPolicy {
                interval: settings.poll_interval(),
                max_attempts: settings.poll_max_attempts,
            });

        log::info!(
            "Enrichment ready: text via {:?}, posters via {}",
            text_chain.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            settings.image_provider
        );

        Ok(Self {
            config: settings,
            tokens,
            text: Arc::new(text),
            images: Arc::new(images),
        })
    }
}
