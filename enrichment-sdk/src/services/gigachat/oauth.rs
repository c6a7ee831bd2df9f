//! GigaChat client-credential exchange

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use reqwest::Client;

use super::models::OAuthTokenResponse;
use crate::auth::TokenExchange;
use crate::config::GigaChatConfig;
use crate::core::ProviderId;
use crate::error::{Result, ServiceError};
use crate::models::{AccessToken, ProviderCredential};
use crate::services::common::{build_http_client, execute};
use crate::util::generate_request_id;

/// Lifetime assumed when the endpoint omits `expires_at`
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 60);

pub struct GigaChatTokenExchange {
    http_client: Client,
    config: GigaChatConfig,
    credential: ProviderCredential,
}

impl GigaChatTokenExchange {
    pub fn new(config: GigaChatConfig, credential: ProviderCredential, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(timeout, config.accept_invalid_certs)?,
            config,
            credential,
        })
    }

    /// Value for the `Authorization: Basic` header
    ///
    /// The personal cabinet hands out an already encoded authorization key;
    /// a raw `client_id:client_secret` pair is encoded here.
    pub fn basic_credentials(secret: &str) -> String {
        let secret = secret.trim();
        if secret.contains(':') {
            STANDARD.encode(secret.as_bytes())
        } else {
            secret.to_string()
        }
    }
}

/// Any exchange failure is an authentication failure for the caller
fn into_auth_error(error: ServiceError) -> ServiceError {
    match error {
        ServiceError::Upstream { message, context, .. } => ServiceError::Authentication {
            message: format!("Token exchange failed: {}", message),
            context,
        },
        other => other,
    }
}

#[async_trait]
impl TokenExchange for GigaChatTokenExchange {
    fn provider(&self) -> ProviderId {
        ProviderId::GigaChat
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let endpoint = self.config.oauth_url.as_str();

        let request = self
            .http_client
            .post(endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!(
                    "Basic {}",
                    Self::basic_credentials(self.credential.expose_secret())
                ),
            )
            .header("RqUID", generate_request_id())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("scope", self.config.scope.as_str())]);

        let body = execute(ProviderId::GigaChat, endpoint, request)
            .await
            .map_err(into_auth_error)?;

        let token: OAuthTokenResponse = serde_json::from_str(&body).map_err(|e| {
            ServiceError::authentication(
                ProviderId::GigaChat,
                format!("Token endpoint returned malformed body: {}", e),
            )
        })?;

        let value = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ServiceError::authentication(
                    ProviderId::GigaChat,
                    "Token endpoint response has no access_token",
                )
            })?;

        let expires_at = match token.expires_at {
            Some(millis) => Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                ServiceError::authentication(
                    ProviderId::GigaChat,
                    format!("Token endpoint returned invalid expires_at {}", millis),
                )
            })?,
            None => Utc::now() + chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME.as_secs() as i64),
        };

        Ok(AccessToken::new(value, expires_at))
    }
}
