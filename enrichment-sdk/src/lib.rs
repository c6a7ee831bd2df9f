//! # Enrichment SDK
//!
//! Multi-provider AI orchestration for enriching a media catalog with
//! metadata and poster art.
//!
//! This crate provides:
//!
//! - A uniform contract over divergent provider APIs (`TextLookup`,
//!   `ImageGenerate`) with adapters for Gemini, GigaChat, YandexGPT, OpenAI,
//!   Stability, Imagen and YandexART
//! - Credential handling and a single-flight OAuth token cache
//! - A bounded polling state machine for asynchronous image jobs
//! - Normalization of loosely-typed model answers into `ContentResult`
//! - A typed error taxonomy with a fixed HTTP status mapping
//!
//! ## Architecture
//!
//! - `CredentialStore`: provider secrets resolved at startup
//! - `TokenManager`: cached bearer tokens, one exchange in flight per provider
//! - `services`: one adapter per provider, selected by configuration
//! - `TextSearchOrchestrator` / `ImageGenerationOrchestrator`: entry points
//! - `ResponseNormalizer`: shared validation of provider output

pub mod auth;
pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod orchestration;
pub mod services;
pub mod util;

pub use crate::auth::{TokenExchange, TokenManager};
pub use crate::config::{ConfigProvider, EnrichmentConfig, ServiceConfig};
pub use crate::core::{
    Capability, Clock, ClientBuilder, GenerationOutcome, ImageGenerate, ManualClock, PollStatus,
    ProviderId, SystemClock, TextLookup,
};
pub use crate::credentials::CredentialStore;
pub use crate::error::{ErrorContext, Result, ServiceError, TimeoutCause, UpstreamFailure};
pub use crate::models::{
    AccessToken, AsyncHandle, ContentQuery, ContentResult, ContentType, GenerationJob, ImageSource,
    JobStatus, PosterImage, PosterRequest, ProviderCredential, RawProviderResponse,
};
pub use crate::normalizer::ResponseNormalizer;
pub use crate::orchestration::{
    Enrichment, ImageGenerationOrchestrator, PollPolicy, PosterGeneration, TextSearchOrchestrator,
};

#[cfg(test)]
mod tests;
