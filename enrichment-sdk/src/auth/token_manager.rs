//! Process-wide token cache with single-flight exchange per provider
//!
//! Each provider has its own async mutex guarding an optional cached token.
//! A caller holds the lock across the exchange, so concurrent callers for
//! the same provider queue behind the first one and then see its token
//! instead of exchanging again. Different providers never contend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::TokenExchange;
use crate::core::{Clock, ProviderId, SystemClock};
use crate::error::{Result, ServiceError};
use crate::models::AccessToken;

struct TokenSlot {
    exchanger: Arc<dyn TokenExchange>,
    cached: Mutex<Option<AccessToken>>,
}

pub struct TokenManager {
    slots: HashMap<ProviderId, TokenSlot>,
    clock: Arc<dyn Clock>,
    refresh_margin: Duration,
}

impl TokenManager {
    /// Default time before expiry at which a token is treated as stale
    pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

    pub fn new(exchangers: Vec<Arc<dyn TokenExchange>>) -> Self {
        let slots = exchangers
            .into_iter()
            .map(|exchanger| {
                (
                    exchanger.provider(),
                    TokenSlot {
                        exchanger,
                        cached: Mutex::new(None),
                    },
                )
            })
            .collect();

        Self {
            slots,
            clock: Arc::new(SystemClock),
            refresh_margin: Self::DEFAULT_REFRESH_MARGIN,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Whether an exchanger is registered for this provider
    pub fn manages(&self, provider: ProviderId) -> bool {
        self.slots.contains_key(&provider)
    }

    /// Return a token valid beyond the refresh margin, exchanging if needed
    pub async fn acquire(&self, provider: ProviderId) -> Result<AccessToken> {
        let slot = self.slots.get(&provider).ok_or_else(|| {
            ServiceError::configuration(format!("No token exchange configured for {}", provider))
        })?;

        let mut cached = slot.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(self.clock.now(), self.refresh_margin) {
                log::debug!("Using cached access token for {}", provider);
                return Ok(token.clone());
            }
            log::debug!("Cached access token for {} is stale", provider);
        }

        log::debug!("Exchanging credentials for {} access token", provider);
        match slot.exchanger.exchange().await {
            Ok(token) => {
                log::info!(
                    "Obtained {} access token, expires at {}",
                    provider,
                    token.expires_at()
                );
                *cached = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                log::warn!("Token exchange for {} failed: {}", provider, e);
                *cached = None;
                Err(e)
            }
        }
    }

    /// Drop the cached token so the next `acquire` exchanges again
    pub async fn invalidate(&self, provider: ProviderId) {
        if let Some(slot) = self.slots.get(&provider) {
            log::debug!("Invalidating cached access token for {}", provider);
            *slot.cached.lock().await = None;
        }
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("providers", &self.slots.keys().collect::<Vec<_>>())
            .field("refresh_margin", &self.refresh_margin)
            .finish()
    }
}
