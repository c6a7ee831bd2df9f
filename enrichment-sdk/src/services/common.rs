//! Common utilities for provider adapters
//!
//! Every adapter sends its request through `execute_json`, which attaches
//! the provider id to transport failures, maps non-2xx statuses and turns
//! undecodable envelopes into `Upstream{MalformedResponse}`.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::core::{ClientBuilder, ProviderId};
use crate::error::mapping::{classify_http_error, map_http_error};
use crate::error::{Result, ServiceError};
use crate::models::PosterImage;
use crate::util::{sanitize_for_logging, truncate_string};

/// Longest upstream body excerpt written to the debug log
const MAX_LOGGED_BODY: usize = 500;

/// Build the HTTP client for one adapter
pub fn build_http_client(timeout: Duration, accept_invalid_certs: bool) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .accept_invalid_certs(accept_invalid_certs)
        .build_http_client()
}

/// Send a request and decode a JSON envelope
pub async fn execute_json<T: DeserializeOwned>(
    provider: ProviderId,
    endpoint: &str,
    request: RequestBuilder,
) -> Result<T> {
    let body = execute(provider, endpoint, request).await?;

    serde_json::from_str::<T>(&body).map_err(|e| {
        log::debug!(
            "{} returned an unexpected envelope from {}: {}",
            provider,
            endpoint,
            truncate_string(&sanitize_for_logging(&body), MAX_LOGGED_BODY)
        );
        ServiceError::malformed(provider, format!("Unexpected response envelope: {}", e))
            .at_endpoint(endpoint)
    })
}

/// Send a request and return the raw 2xx body
pub async fn execute(provider: ProviderId, endpoint: &str, request: RequestBuilder) -> Result<String> {
    let start = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::from(e).for_provider(provider).at_endpoint(endpoint))?;

    let status = response.status();
    log::debug!(
        "{} {} responded {} in {:.0}ms",
        provider,
        endpoint,
        status.as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if !status.is_success() {
        return Err(parse_error_response(provider, endpoint, response).await);
    }

    response
        .text()
        .await
        .map_err(|e| ServiceError::from(e).for_provider(provider).at_endpoint(endpoint))
}

/// Parse error response from HTTP response
pub async fn parse_error_response(
    provider: ProviderId,
    endpoint: &str,
    response: Response,
) -> ServiceError {
    let status = response.status();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    log::warn!(
        "{} request to {} failed with {} ({}): {}",
        provider,
        endpoint,
        status.as_u16(),
        classify_http_error(status),
        truncate_string(&sanitize_for_logging(&body), MAX_LOGGED_BODY)
    );

    map_http_error(provider, status, &body).at_endpoint(endpoint)
}

/// Wrap a base64 image payload once it is known to decode to image bytes
pub fn decode_image(
    provider: ProviderId,
    endpoint: &str,
    mime_type: impl Into<String>,
    payload: String,
) -> Result<PosterImage> {
    match STANDARD.decode(payload.trim()) {
        Ok(bytes) if !bytes.is_empty() => {
            log::debug!("{} returned a {} byte image", provider, bytes.len());
            Ok(PosterImage::base64(mime_type, payload.trim()))
        }
        Ok(_) => Err(ServiceError::malformed(provider, "Image payload is empty").at_endpoint(endpoint)),
        Err(e) => Err(ServiceError::malformed(
            provider,
            format!("Image payload is not valid base64: {}", e),
        )
        .at_endpoint(endpoint)),
    }
}
