//! Tests for configuration management functionality
//!
//! These tests verify the config providers and the typed provider configs.

#[cfg(test)]
mod tests {
    use std::env;

    use crate::config::{
        default_env_chain, ConfigProvider, ConfigProviderExt, EnrichmentConfig, EnvConfigProvider,
        GeminiConfig, GigaChatConfig, ImagenConfig, MemoryConfigProvider, OpenAIImageConfig,
        ServiceConfig, StabilityConfig, YandexConfig,
    };
    use crate::core::ProviderId;
    use crate::error::ServiceError;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("request_timeout_seconds", "30");
        provider.set("gigachat_accept_invalid_certs", "yes");

        assert_eq!(provider.get_int("request_timeout_seconds").unwrap(), 30);
        assert!(provider.get_bool("gigachat_accept_invalid_certs").unwrap());
        assert_eq!(provider.get_string_or("missing", "default"), "default");
        assert!(provider.get_string("missing").is_err());

        let seeded = MemoryConfigProvider::with_values(
            [("text_provider".to_string(), "gigachat".to_string())].into_iter().collect(),
        );
        assert_eq!(seeded.get_required("text_provider").unwrap(), "gigachat");
    }

    #[test]
    fn test_duration_values() {
        let provider = MemoryConfigProvider::new()
            .with("request_budget_seconds", "45")
            .with("poll", "500ms")
            .with("broken", "soon");

        assert_eq!(
            provider.get_duration("request_budget_seconds").unwrap(),
            std::time::Duration::from_secs(45)
        );
        assert_eq!(
            provider.get_duration("poll").unwrap(),
            std::time::Duration::from_millis(500)
        );
        assert!(matches!(
            provider.get_duration("broken"),
            Err(ServiceError::Configuration(_))
        ));
        assert_eq!(
            provider.get_duration_or("missing", std::time::Duration::from_secs(90)),
            std::time::Duration::from_secs(90)
        );
    }

    #[test]
    fn test_env_config_provider() {
        env::set_var("ENRICHMENT_TEST_POLL_MAX_ATTEMPTS", "12");
        env::set_var("ENRICHMENT_TEST_TEXT_PROVIDER", "yandex-gpt");

        let provider = EnvConfigProvider::new()
            .with_prefix("ENRICHMENT")
            .with_namespace("TEST");

        assert_eq!(provider.get_int("poll_max_attempts").unwrap(), 12);
        assert_eq!(provider.get_string("text_provider").unwrap(), "yandex-gpt");
        assert!(provider.get_string("image_provider").is_err());

        env::remove_var("ENRICHMENT_TEST_POLL_MAX_ATTEMPTS");
        env::remove_var("ENRICHMENT_TEST_TEXT_PROVIDER");
    }

    #[test]
    fn test_default_env_chain_prefers_prefixed_keys() {
        env::set_var("ENRICHMENT_CHAIN_CHECK_KEY", "prefixed");
        env::set_var("CHAIN_CHECK_KEY", "bare");
        env::set_var("CHAIN_CHECK_ONLY_BARE", "bare");

        let chain = default_env_chain();
        assert_eq!(chain.get_string("chain_check_key").unwrap(), "prefixed");
        assert_eq!(chain.get_string("chain_check_only_bare").unwrap(), "bare");

        env::remove_var("ENRICHMENT_CHAIN_CHECK_KEY");
        env::remove_var("CHAIN_CHECK_KEY");
        env::remove_var("CHAIN_CHECK_ONLY_BARE");
    }

    #[test]
    fn test_enrichment_config_defaults() {
        let config = EnrichmentConfig::from_provider(&MemoryConfigProvider::new()).unwrap();

        assert_eq!(config, EnrichmentConfig::default());
        assert_eq!(config.text_provider, ProviderId::Gemini);
        assert!(config.text_fallbacks.is_empty());
        assert_eq!(config.image_provider, ProviderId::OpenAI);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.poll_max_attempts, 30);
        assert_eq!(config.text_chain(), vec![ProviderId::Gemini]);
    }

    #[test]
    fn test_enrichment_config_fallback_chain() {
        let provider = MemoryConfigProvider::new()
            .with("text_provider", "gigachat")
            .with("text_fallbacks", "gemini, yandex-gpt")
            .with("image_provider", "yandex-art");

        let config = EnrichmentConfig::from_provider(&provider).unwrap();
        assert_eq!(
            config.text_chain(),
            vec![ProviderId::GigaChat, ProviderId::Gemini, ProviderId::YandexGpt]
        );
        assert_eq!(config.image_provider, ProviderId::YandexArt);
    }

    #[test]
    fn test_enrichment_config_rejects_wrong_capability() {
        let provider = MemoryConfigProvider::new().with("text_provider", "openai");
        assert!(matches!(
            EnrichmentConfig::from_provider(&provider),
            Err(ServiceError::Configuration(_))
        ));

        let provider = MemoryConfigProvider::new().with("image_provider", "gemini");
        assert!(EnrichmentConfig::from_provider(&provider).is_err());

        let provider = MemoryConfigProvider::new().with("text_provider", "midjourney");
        assert!(EnrichmentConfig::from_provider(&provider).is_err());

        let provider = MemoryConfigProvider::new()
            .with("text_provider", "gemini")
            .with("text_fallbacks", "gemini");
        assert!(EnrichmentConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_enrichment_config_rejects_zero_budget() {
        let provider = MemoryConfigProvider::new().with("poll_max_attempts", "0");
        assert!(EnrichmentConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_provider_config_defaults() {
        let empty = MemoryConfigProvider::new();

        let gemini = GeminiConfig::from_provider(&empty).unwrap();
        assert_eq!(gemini.model, "gemini-1.5-flash");

        let gigachat = GigaChatConfig::from_provider(&empty).unwrap();
        assert_eq!(gigachat.scope, "GIGACHAT_API_PERS");
        assert!(!gigachat.accept_invalid_certs);

        let openai = OpenAIImageConfig::from_provider(&empty).unwrap();
        assert_eq!(openai.model, "dall-e-3");
        assert_eq!(openai.size, "1024x1024");

        let stability = StabilityConfig::from_provider(&empty).unwrap();
        assert_eq!(stability.provider(), ProviderId::Stability);

        let imagen = ImagenConfig::from_provider(&empty).unwrap();
        assert_eq!(imagen.aspect_ratio, "3:4");
    }

    #[test]
    fn test_base_urls_are_trimmed_and_validated() {
        let provider = MemoryConfigProvider::new().with("gemini_base_url", "http://localhost:9000/");
        assert_eq!(
            GeminiConfig::from_provider(&provider).unwrap().base_url,
            "http://localhost:9000"
        );

        let provider = MemoryConfigProvider::new().with("openai_base_url", "not a url");
        assert!(OpenAIImageConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_yandex_config_requires_folder() {
        assert!(YandexConfig::from_provider(&MemoryConfigProvider::new()).is_err());

        let config =
            YandexConfig::from_provider(&MemoryConfigProvider::new().with("yandex_folder_id", "b1g"))
                .unwrap();
        assert_eq!(config.gpt_model_uri(), "gpt://b1g/yandexgpt-lite/latest");
        assert_eq!(config.art_model_uri(), "art://b1g/yandex-art/latest");
        assert_eq!(config.operations_url, YandexConfig::DEFAULT_BASE_URL);
    }
}
