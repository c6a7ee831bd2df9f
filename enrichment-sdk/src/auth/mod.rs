//! Bearer tokens for providers that use a client-credential exchange

pub mod token_manager;

pub use token_manager::TokenManager;

use async_trait::async_trait;

use crate::core::ProviderId;
use crate::error::Result;
use crate::models::AccessToken;

/// One provider's OAuth exchange
///
/// Implementations perform exactly one HTTP exchange per call; caching and
/// de-duplication belong to the `TokenManager`.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn exchange(&self) -> Result<AccessToken>;
}
