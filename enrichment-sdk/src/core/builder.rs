//! Client builder implementation
//!
//! Provides a unified builder for the per-adapter HTTP clients.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;

use crate::error::{Result, ServiceError};

/// Default user agent sent to every provider
pub const DEFAULT_USER_AGENT: &str = concat!("enrichment-sdk/", env!("CARGO_PKG_VERSION"));

/// Unified HTTP client builder for all provider adapters
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// Request timeout
    timeout: Option<Duration>,

    /// User agent
    user_agent: Option<String>,

    /// Enable response decompression
    compression: bool,

    /// Skip TLS certificate verification
    accept_invalid_certs: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            custom_headers: HashMap::new(),
            timeout: Some(Duration::from_secs(60)),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            compression: true,
            accept_invalid_certs: false,
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enable or disable compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Accept invalid TLS certificates for this client only
    ///
    /// Only the GigaChat endpoints opt into this, and only when
    /// `GIGACHAT_ACCEPT_INVALID_CERTS` is set.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Build an HTTP client with the configured settings
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder = builder.gzip(self.compression);

        if self.accept_invalid_certs {
            log::warn!("TLS certificate verification disabled for this client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &self.custom_headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| ServiceError::configuration(format!("Invalid header name: {}", e)))?;

            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ServiceError::configuration(format!("Invalid header value: {}", e)))?;

            headers.insert(header_name, header_value);
        }

        builder = builder.default_headers(headers);

        builder
            .build()
            .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
    }
}
