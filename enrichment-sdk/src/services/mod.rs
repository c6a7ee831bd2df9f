//! Provider adapter implementations
//!
//! One module per external service. The factory functions below build the
//! adapter selected by configuration, so the orchestrators only ever see
//! `TextLookup` / `ImageGenerate` trait objects.

pub mod common;
pub mod gemini;
pub mod gigachat;
pub mod imagen;
pub mod openai;
pub mod stability;
pub mod yandex;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenExchange;
use crate::config::{
    ConfigProvider, GeminiConfig, GigaChatConfig, ImagenConfig, OpenAIImageConfig,
    StabilityConfig, YandexConfig,
};
use crate::core::{Capability, ImageGenerate, ProviderId, TextLookup};
use crate::credentials::CredentialStore;
use crate::error::{Result, ServiceError};

/// Lookup instruction shared by every text provider
pub fn content_search_prompt(query: &str) -> String {
    format!(
        r#"Найди информацию о фильме, сериале или ТВ-программе: "{query}"

Верни JSON со следующими полями:
- title: название на русском
- description: краткое описание (2-3 предложения)
- genre: жанр на русском (один, основной)
- rating: рейтинг от 0 до 10 (число)
- year: год выхода (число)
- type: тип контента - "movie" для фильмов, "series" для сериалов, "tv" для ТВ-каналов
- image_suggestion: описание постера для генерации (на английском, детальное)

Если не можешь найти информацию, верни пустой объект {{}}.
Отвечай ТОЛЬКО валидным JSON, без дополнительного текста."#
    )
}

fn expect_capability(provider: ProviderId, capability: Capability) -> Result<()> {
    if provider.capability() != capability {
        return Err(ServiceError::configuration(format!(
            "{} does not support {:?}",
            provider, capability
        )));
    }
    Ok(())
}

/// Build the text adapter for `provider`
pub fn build_text_adapter<P: ConfigProvider + ?Sized>(
    provider: ProviderId,
    config: &P,
    credentials: &CredentialStore,
    timeout: Duration,
) -> Result<Arc<dyn TextLookup>> {
    expect_capability(provider, Capability::TextLookup)?;

    let adapter: Arc<dyn TextLookup> = match provider {
        ProviderId::Gemini => Arc::new(gemini::GeminiLookup::new(
            GeminiConfig::from_provider(config)?,
            credentials.get(provider)?.clone(),
            timeout,
        )?),
        ProviderId::GigaChat => {
            // the secret is only used by the token exchange, but must exist
            credentials.get(provider)?;
            Arc::new(gigachat::GigaChatLookup::new(
                GigaChatConfig::from_provider(config)?,
                timeout,
            )?)
        }
        ProviderId::YandexGpt => Arc::new(yandex::YandexGptLookup::new(
            YandexConfig::from_provider(config)?,
            credentials.get(provider)?.clone(),
            timeout,
        )?),
        other => {
            return Err(ServiceError::configuration(format!(
                "{} is not a text provider",
                other
            )))
        }
    };

    Ok(adapter)
}

/// Build the image adapter for `provider`
pub fn build_image_adapter<P: ConfigProvider + ?Sized>(
    provider: ProviderId,
    config: &P,
    credentials: &CredentialStore,
    timeout: Duration,
) -> Result<Arc<dyn ImageGenerate>> {
    expect_capability(provider, Capability::ImageGenerate)?;
    let credential = credentials.get(provider)?.clone();

    let adapter: Arc<dyn ImageGenerate> = match provider {
        ProviderId::OpenAI => Arc::new(openai::OpenAIImageGenerator::new(
            OpenAIImageConfig::from_provider(config)?,
            credential,
            timeout,
        )?),
        ProviderId::Stability => Arc::new(stability::StabilityImageGenerator::new(
            StabilityConfig::from_provider(config)?,
            credential,
            timeout,
        )?),
        ProviderId::Imagen => Arc::new(imagen::ImagenGenerator::new(
            ImagenConfig::from_provider(config)?,
            credential,
            timeout,
        )?),
        ProviderId::YandexArt => Arc::new(yandex::YandexArtGenerator::new(
            YandexConfig::from_provider(config)?,
            credential,
            timeout,
        )?),
        other => {
            return Err(ServiceError::configuration(format!(
                "{} is not an image provider",
                other
            )))
        }
    };

    Ok(adapter)
}

/// Build token exchangers for the selected providers that need one
pub fn build_token_exchangers<P: ConfigProvider + ?Sized>(
    providers: &[ProviderId],
    config: &P,
    credentials: &CredentialStore,
    timeout: Duration,
) -> Result<Vec<Arc<dyn TokenExchange>>> {
    let mut exchangers: Vec<Arc<dyn TokenExchange>> = Vec::new();

    for &provider in providers {
        if !provider.requires_access_token()
            || exchangers.iter().any(|e| e.provider() == provider)
        {
            continue;
        }

        match provider {
            ProviderId::GigaChat => exchangers.push(Arc::new(gigachat::GigaChatTokenExchange::new(
                GigaChatConfig::from_provider(config)?,
                credentials.get(provider)?.clone(),
                timeout,
            )?)),
            other => {
                return Err(ServiceError::configuration(format!(
                    "No token exchange implemented for {}",
                    other
                )))
            }
        }
    }

    Ok(exchangers)
}
