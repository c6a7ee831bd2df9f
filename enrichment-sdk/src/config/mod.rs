//! Configuration management for provider adapters
//!
//! Configuration is read through the `ConfigProvider` abstraction so the
//! same typed configs load from environment variables in production and
//! from in-memory maps in tests. Secrets are not part of the typed configs;
//! they are read by the `CredentialStore`.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::{Capability, ProviderId};
use crate::error::{Result, ServiceError};

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a boolean configuration value
    fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(ServiceError::configuration(format!(
                "Invalid boolean value for key {}: {}",
                key, value
            ))),
        }
    }

    /// Get a duration such as `90s`, `500ms` or `2m`; bare numbers are seconds
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let value = self.get_string(key)?;
        crate::util::parse_duration(&value).ok_or_else(|| {
            ServiceError::configuration(format!("Invalid duration for key {}: {}", key, value))
        })
    }

    /// Get a non-empty string configuration value
    fn get_required(&self, key: &str) -> Result<String> {
        let value = self.get_string(key)?;
        if value.trim().is_empty() {
            return Err(ServiceError::configuration(format!(
                "Configuration key {} is empty",
                key
            )));
        }
        Ok(value.trim().to_string())
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a boolean configuration value with a default
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Get a duration configuration value with a default
    fn get_duration_or(&self, key: &str, default: Duration) -> Duration {
        self.get_duration(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "GEMINI", "YANDEX")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }

    /// Builder-style `set`
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.set(key, value);
        self
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Debug, Clone)]
pub struct CompositeConfigProvider<P: ConfigProvider> {
    providers: Vec<P>,
}

impl<P: ConfigProvider> Default for CompositeConfigProvider<P> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
        }
    }
}

impl<P: ConfigProvider> CompositeConfigProvider<P> {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new provider with an initial list
    pub fn with_providers(providers: Vec<P>) -> Self {
        Self { providers }
    }
}

impl<P: ConfigProvider> ConfigProvider for CompositeConfigProvider<P> {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(ServiceError::configuration(format!(
            "Configuration key not found in any provider: {}",
            key
        )))
    }
}

/// `ENRICHMENT_`-prefixed variables first, then the bare provider names
pub fn default_env_chain() -> CompositeConfigProvider<EnvConfigProvider> {
    CompositeConfigProvider::with_providers(vec![
        EnvConfigProvider::new().with_prefix("ENRICHMENT"),
        EnvConfigProvider::new(),
    ])
}

/// Trait for provider-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Provider this configuration belongs to
    fn provider(&self) -> ProviderId;
}

fn validate_url(provider: ProviderId, field: &str, value: &str) -> Result<()> {
    Url::parse(value).map(|_| ()).map_err(|e| {
        ServiceError::configuration(format!("{} {} is not a valid URL ({}): {}", provider, field, value, e))
    })
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Orchestration-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Primary text lookup provider
    pub text_provider: ProviderId,

    /// Opt-in fallback chain tried after provider failures, empty by default
    pub text_fallbacks: Vec<ProviderId>,

    /// Poster generation provider
    pub image_provider: ProviderId,

    /// Delay before each async job status check
    pub poll_interval_ms: u64,

    /// Status checks allowed per job
    pub poll_max_attempts: u32,

    /// Per HTTP call timeout
    pub request_timeout_seconds: u64,

    /// Tokens are refreshed this long before they expire
    pub token_refresh_margin_seconds: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            text_provider: ProviderId::Gemini,
            text_fallbacks: Vec::new(),
            image_provider: ProviderId::OpenAI,
            poll_interval_ms: 2000,
            poll_max_attempts: 30,
            request_timeout_seconds: 60,
            token_refresh_margin_seconds: 60,
        }
    }
}

impl EnrichmentConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let text_provider = match provider.get_string("text_provider") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => defaults.text_provider,
        };
        let image_provider = match provider.get_string("image_provider") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => defaults.image_provider,
        };
        let text_fallbacks = provider
            .get_string("text_fallbacks")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ProviderId::from_str)
            .collect::<Result<Vec<_>>>()?;

        let config = Self {
            text_provider,
            text_fallbacks,
            image_provider,
            poll_interval_ms: provider.get_int_or("poll_interval_ms", defaults.poll_interval_ms as i64)
                .max(0) as u64,
            poll_max_attempts: provider
                .get_int_or("poll_max_attempts", defaults.poll_max_attempts as i64)
                .max(0) as u32,
            request_timeout_seconds: provider
                .get_int_or("request_timeout_seconds", defaults.request_timeout_seconds as i64)
                .max(0) as u64,
            token_refresh_margin_seconds: provider
                .get_int_or(
                    "token_refresh_margin_seconds",
                    defaults.token_refresh_margin_seconds as i64,
                )
                .max(0) as u64,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for provider in std::iter::once(&self.text_provider).chain(self.text_fallbacks.iter()) {
            if provider.capability() != Capability::TextLookup {
                return Err(ServiceError::configuration(format!(
                    "{} cannot be used for text lookup",
                    provider
                )));
            }
        }

        if self.image_provider.capability() != Capability::ImageGenerate {
            return Err(ServiceError::configuration(format!(
                "{} cannot be used for image generation",
                self.image_provider
            )));
        }

        if self.text_fallbacks.contains(&self.text_provider) {
            return Err(ServiceError::configuration(
                "Text fallbacks must not repeat the primary provider",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ServiceError::configuration("Poll interval must be positive"));
        }

        if self.poll_max_attempts == 0 {
            return Err(ServiceError::configuration("Poll attempt budget must be positive"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ServiceError::configuration("Request timeout must be positive"));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn token_refresh_margin(&self) -> Duration {
        Duration::from_secs(self.token_refresh_margin_seconds)
    }

    /// Primary text provider followed by the fallbacks
    pub fn text_chain(&self) -> Vec<ProviderId> {
        std::iter::once(self.text_provider)
            .chain(self.text_fallbacks.iter().copied())
            .collect()
    }
}

/// Google Gemini text generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

impl GeminiConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: trim_base(provider.get_string_or("gemini_base_url", &defaults.base_url)),
            model: provider.get_string_or("gemini_model", &defaults.model),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for GeminiConfig {
    fn validate(&self) -> Result<()> {
        validate_url(self.provider(), "base URL", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("Gemini model is required"));
        }
        Ok(())
    }

    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }
}

/// Sber GigaChat chat completions plus its OAuth endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GigaChatConfig {
    pub base_url: String,
    pub oauth_url: String,
    pub scope: String,
    pub model: String,
    pub max_tokens: u32,

    /// Skip certificate verification for the GigaChat hosts only
    pub accept_invalid_certs: bool,
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gigachat.devices.sberbank.ru".to_string(),
            oauth_url: "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string(),
            scope: "GIGACHAT_API_PERS".to_string(),
            model: "GigaChat".to_string(),
            max_tokens: 1000,
            accept_invalid_certs: false,
        }
    }
}

impl GigaChatConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: trim_base(provider.get_string_or("gigachat_base_url", &defaults.base_url)),
            oauth_url: provider.get_string_or("gigachat_oauth_url", &defaults.oauth_url),
            scope: provider.get_string_or("gigachat_scope", &defaults.scope),
            model: provider.get_string_or("gigachat_model", &defaults.model),
            max_tokens: provider
                .get_int_or("gigachat_max_tokens", defaults.max_tokens as i64)
                .max(1) as u32,
            accept_invalid_certs: provider
                .get_bool_or("gigachat_accept_invalid_certs", defaults.accept_invalid_certs),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for GigaChatConfig {
    fn validate(&self) -> Result<()> {
        validate_url(self.provider(), "base URL", &self.base_url)?;
        validate_url(self.provider(), "OAuth URL", &self.oauth_url)?;
        if self.scope.trim().is_empty() {
            return Err(ServiceError::configuration("GigaChat scope is required"));
        }
        Ok(())
    }

    fn provider(&self) -> ProviderId {
        ProviderId::GigaChat
    }
}

/// Yandex Cloud foundation models (YandexGPT and YandexART share a folder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YandexConfig {
    pub folder_id: String,
    pub base_url: String,
    pub operations_url: String,
}

impl YandexConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://llm.api.cloud.yandex.net";

    pub fn new(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            operations_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let folder_id = provider.get_required("yandex_folder_id")?;
        let config = Self {
            folder_id,
            base_url: trim_base(provider.get_string_or("yandex_base_url", Self::DEFAULT_BASE_URL)),
            operations_url: trim_base(
                provider.get_string_or("yandex_operations_url", Self::DEFAULT_BASE_URL),
            ),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn gpt_model_uri(&self) -> String {
        format!("gpt://{}/yandexgpt-lite/latest", self.folder_id)
    }

    pub fn art_model_uri(&self) -> String {
        format!("art://{}/yandex-art/latest", self.folder_id)
    }
}

impl ServiceConfig for YandexConfig {
    fn validate(&self) -> Result<()> {
        if self.folder_id.trim().is_empty() {
            return Err(ServiceError::configuration("Yandex folder ID is required"));
        }
        validate_url(self.provider(), "base URL", &self.base_url)?;
        validate_url(self.provider(), "operations URL", &self.operations_url)
    }

    fn provider(&self) -> ProviderId {
        ProviderId::YandexGpt
    }
}

/// OpenAI image generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIImageConfig {
    pub base_url: String,
    pub model: String,
    pub size: String,
    pub quality: String,
}

impl Default for OpenAIImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
        }
    }
}

impl OpenAIImageConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: trim_base(provider.get_string_or("openai_base_url", &defaults.base_url)),
            model: provider.get_string_or("openai_image_model", &defaults.model),
            size: provider.get_string_or("openai_image_size", &defaults.size),
            quality: provider.get_string_or("openai_image_quality", &defaults.quality),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for OpenAIImageConfig {
    fn validate(&self) -> Result<()> {
        validate_url(self.provider(), "base URL", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("OpenAI image model is required"));
        }
        Ok(())
    }

    fn provider(&self) -> ProviderId {
        ProviderId::OpenAI
    }
}

/// Stability AI text-to-image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    pub base_url: String,
    pub engine: String,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stability.ai".to_string(),
            engine: "stable-diffusion-xl-1024-v1-0".to_string(),
        }
    }
}

impl StabilityConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: trim_base(provider.get_string_or("stability_base_url", &defaults.base_url)),
            engine: provider.get_string_or("stability_engine", &defaults.engine),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for StabilityConfig {
    fn validate(&self) -> Result<()> {
        validate_url(self.provider(), "base URL", &self.base_url)?;
        if self.engine.trim().is_empty() {
            return Err(ServiceError::configuration("Stability engine is required"));
        }
        Ok(())
    }

    fn provider(&self) -> ProviderId {
        ProviderId::Stability
    }
}

/// Google Imagen predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagenConfig {
    pub base_url: String,
    pub model: String,
    pub aspect_ratio: String,
}

impl Default for ImagenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "imagen-3.0-generate-002".to_string(),
            aspect_ratio: "3:4".to_string(),
        }
    }
}

impl ImagenConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: trim_base(provider.get_string_or("imagen_base_url", &defaults.base_url)),
            model: provider.get_string_or("imagen_model", &defaults.model),
            aspect_ratio: provider.get_string_or("imagen_aspect_ratio", &defaults.aspect_ratio),
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for ImagenConfig {
    fn validate(&self) -> Result<()> {
        validate_url(self.provider(), "base URL", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ServiceError::configuration("Imagen model is required"));
        }
        Ok(())
    }

    fn provider(&self) -> ProviderId {
        ProviderId::Imagen
    }
}
