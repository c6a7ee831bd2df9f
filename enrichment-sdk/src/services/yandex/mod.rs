//! Yandex Cloud adapters: YandexGPT (text) and YandexART (async images)

mod art;
mod gpt;
mod models;

pub use art::YandexArtGenerator;
pub use gpt::YandexGptLookup;
pub use models::*;

use crate::models::ProviderCredential;

fn api_key_header(credential: &ProviderCredential) -> String {
    format!("Api-Key {}", credential.expose_secret())
}
