//! Orchestrators: the entry points callers use
//!
//! - `TextSearchOrchestrator` resolves a query to a normalized `ContentResult`
//! - `ImageGenerationOrchestrator` turns a poster request into a `PosterImage`,
//!   driving the polling state machine for async providers
//! - `bootstrap::Enrichment` wires both from configuration

pub mod bootstrap;
pub mod image;
pub mod polling;
pub mod text;

pub use bootstrap::Enrichment;
pub use image::{ImageGenerationOrchestrator, PosterGeneration};
pub use polling::{JobPoller, PollPolicy};
pub use text::TextSearchOrchestrator;

use std::future::Future;

use crate::auth::TokenManager;
use crate::core::ProviderId;
use crate::error::{Result, ServiceError};
use crate::models::AccessToken;

/// Run a provider call, supplying a bearer token when the provider needs one
///
/// An `Authentication` failure on a token-using call invalidates the cached
/// token and repeats the call once with a freshly exchanged token.
pub(crate) async fn with_access_token<T, F, Fut>(
    tokens: &TokenManager,
    provider: ProviderId,
    call: F,
) -> Result<T>
where
    F: Fn(Option<AccessToken>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if !provider.requires_access_token() {
        return call(None).await;
    }

    let token = tokens.acquire(provider).await?;
    match call(Some(token)).await {
        Err(ServiceError::Authentication { message, .. }) => {
            log::warn!(
                "{} rejected the access token ({}), exchanging once more",
                provider,
                message
            );
            tokens.invalidate(provider).await;
            let token = tokens.acquire(provider).await?;
            call(Some(token)).await
        }
        other => other,
    }
}
