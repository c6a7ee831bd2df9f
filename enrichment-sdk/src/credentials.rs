//! Provider secrets resolved once at startup

use std::collections::HashMap;

use crate::config::{ConfigProvider, ConfigProviderExt};
use crate::core::ProviderId;
use crate::error::{Result, ServiceError};
use crate::models::ProviderCredential;

/// Read-only map of provider secrets
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: HashMap<ProviderId, ProviderCredential>,
}

impl CredentialStore {
    /// Configuration keys holding each provider's secret, in lookup order
    fn secret_keys(provider: ProviderId) -> &'static [&'static str] {
        match provider {
            ProviderId::Gemini => &["gemini_api_key"],
            ProviderId::GigaChat => &["gigachat_auth_key"],
            ProviderId::YandexGpt | ProviderId::YandexArt => &["yandex_api_key"],
            ProviderId::OpenAI => &["openai_api_key"],
            ProviderId::Stability => &["stability_api_key"],
            ProviderId::Imagen => &["imagen_api_key", "gemini_api_key"],
        }
    }

    /// Collect every secret present in configuration
    ///
    /// Missing secrets are not an error here; `get` reports them for the
    /// providers that are actually selected.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Self {
        let credentials = ProviderId::ALL
            .iter()
            .filter_map(|&id| {
                Self::secret_keys(id)
                    .iter()
                    .find_map(|key| provider.get_required(key).ok())
                    .map(|secret| (id, ProviderCredential::new(id, secret)))
            })
            .collect::<HashMap<_, _>>();

        log::debug!(
            "Credential store loaded for providers: {:?}",
            credentials.keys().map(|p| p.as_str()).collect::<Vec<_>>()
        );

        Self { credentials }
    }

    pub fn with_credentials(credentials: impl IntoIterator<Item = ProviderCredential>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|credential| (credential.provider(), credential))
                .collect(),
        }
    }

    pub fn get(&self, provider: ProviderId) -> Result<&ProviderCredential> {
        self.credentials
            .get(&provider)
            .ok_or(ServiceError::MissingCredential(provider))
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.credentials.contains_key(&provider)
    }
}
