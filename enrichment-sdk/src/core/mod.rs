//! Core abstractions for the enrichment SDK
//!
//! This module provides the capability interfaces every provider adapter
//! implements, plus the pieces shared by all of them:
//!
//! - `ProviderId`: identity of an external AI service
//! - `TextLookup`: metadata lookup for a free-text query
//! - `ImageGenerate`: poster generation, either inline or as an async job
//! - `Clock`: time source for the polling state machine
//! - `ClientBuilder`: HTTP client construction

pub mod builder;
pub mod clock;

pub use builder::ClientBuilder;
pub use clock::{Clock, ManualClock, SystemClock};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError, UpstreamFailure};
use crate::models::{
    AccessToken, AsyncHandle, ContentQuery, PosterImage, PosterRequest, RawProviderResponse,
};

/// What a provider can be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    TextLookup,
    ImageGenerate,
}

/// External AI service identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    Gemini,
    #[serde(rename = "gigachat")]
    GigaChat,
    YandexGpt,
    #[serde(rename = "openai")]
    OpenAI,
    Stability,
    Imagen,
    YandexArt,
}

impl ProviderId {
    /// Every known provider
    pub const ALL: [ProviderId; 7] = [
        ProviderId::Gemini,
        ProviderId::GigaChat,
        ProviderId::YandexGpt,
        ProviderId::OpenAI,
        ProviderId::Stability,
        ProviderId::Imagen,
        ProviderId::YandexArt,
    ];

    /// Wire/config name of the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::GigaChat => "gigachat",
            ProviderId::YandexGpt => "yandex-gpt",
            ProviderId::OpenAI => "openai",
            ProviderId::Stability => "stability",
            ProviderId::Imagen => "imagen",
            ProviderId::YandexArt => "yandex-art",
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            ProviderId::Gemini | ProviderId::GigaChat | ProviderId::YandexGpt => {
                Capability::TextLookup
            }
            _ => Capability::ImageGenerate,
        }
    }

    /// Whether calls need a bearer token from the TokenManager
    pub fn requires_access_token(&self) -> bool {
        matches!(self, ProviderId::GigaChat)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ProviderId::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ServiceError::configuration(format!("Unknown provider: {}", s.trim())))
    }
}

/// Result of submitting a poster prompt
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Provider answered inline
    Sync(PosterImage),
    /// Provider accepted a job that must be polled
    Async(AsyncHandle),
}

/// One status check of an async job
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// Job still running
    Pending,
    /// Job finished; `None` when the provider reported completion without an artifact
    Done(Option<PosterImage>),
}

/// Capability: resolve a free-text query to a provider's raw answer
///
/// Adapters shape the request and unwrap the provider envelope but never
/// normalize or retry.
#[async_trait]
pub trait TextLookup: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn lookup(
        &self,
        query: &ContentQuery,
        token: Option<&AccessToken>,
    ) -> Result<RawProviderResponse>;
}

/// Capability: turn a poster prompt into an image
#[async_trait]
pub trait ImageGenerate: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Build a prompt when the caller supplied no image hint
    fn synthesize_prompt(&self, request: &PosterRequest) -> String {
        cinematic_prompt(request)
    }

    async fn generate(
        &self,
        prompt: &str,
        token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome>;

    /// Check an async job. Synchronous providers never hand out handles.
    async fn check_status(
        &self,
        handle: &AsyncHandle,
        _token: Option<&AccessToken>,
    ) -> Result<PollStatus> {
        Err(ServiceError::upstream(
            self.provider(),
            UpstreamFailure::MalformedResponse,
            format!("provider does not support async jobs (job {})", handle.job_id),
        ))
    }
}

/// Default poster phrasing
pub fn cinematic_prompt(request: &PosterRequest) -> String {
    let mut prompt = format!("Professional movie poster for '{}'", request.title.trim());
    if let Some(description) = non_blank(request.description.as_deref()) {
        prompt.push_str(", ");
        prompt.push_str(description);
    }
    if let Some(genre) = non_blank(request.genre.as_deref()) {
        prompt.push_str(&format!(", {} genre", genre));
    }
    prompt.push_str(
        ", cinematic lighting, dramatic composition, high quality, detailed, professional film poster style",
    );
    prompt
}

/// Comma-separated keyword phrasing for diffusion models
pub fn keyword_prompt(request: &PosterRequest) -> String {
    let mut parts = vec![format!("movie poster, \"{}\"", request.title.trim())];
    if let Some(genre) = non_blank(request.genre.as_deref()) {
        parts.push(format!("{} film", genre));
    }
    if let Some(description) = non_blank(request.description.as_deref()) {
        parts.push(description.to_string());
    }
    parts.push("cinematic".to_string());
    parts.push("dramatic lighting".to_string());
    parts.push("highly detailed".to_string());
    parts.push("4k".to_string());
    parts.join(", ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
