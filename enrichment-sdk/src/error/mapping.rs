//! Error mapping for provider APIs
//!
//! Converts non-2xx provider responses into the normalized `ServiceError`
//! taxonomy. Every provider failure is an upstream error; only credential
//! rejections on token-using calls become authentication errors so the
//! orchestrator can re-exchange once.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError, UpstreamFailure};
use crate::core::ProviderId;
use crate::util::{sanitize_for_logging, truncate_string};

/// Maximum length of an upstream body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// Extract a human readable message from a provider error envelope
///
/// Handles the shapes used by the supported providers:
/// `{"error":{"message":..}}` (OpenAI, Google), `{"message":..}`
/// (GigaChat, Stability), `{"error": ".."}` and Yandex's
/// `{"error":{"message":..,"code":..}}` / `{"message":..,"code":..}`.
pub fn extract_error_message(json: &Value) -> Option<String> {
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
        if let Some(message) = error.as_str() {
            return Some(message.to_string());
        }
    }

    json.get("message")
        .or_else(|| json.get("error_description"))
        .or_else(|| json.get("name"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn extract_error_code(json: &Value) -> Option<String> {
    let code = json
        .get("error")
        .and_then(|e| e.get("code").or_else(|| e.get("status")))
        .or_else(|| json.get("code"))?;

    match code {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Map a non-2xx provider response to a ServiceError
pub fn map_http_error(provider: ProviderId, status: StatusCode, body: &str) -> ServiceError {
    let mut context = ErrorContext::for_provider(provider).status_code(status.as_u16());

    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            if let Some(code) = extract_error_code(&json) {
                context = context.error_code(code);
            }
            extract_error_message(&json).unwrap_or_else(|| status.to_string())
        }
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!(
            "{}: {}",
            status,
            truncate_string(&sanitize_for_logging(body), MAX_ERROR_BODY)
        ),
    };

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ServiceError::authentication(provider, message)
        }
        _ => ServiceError::upstream(provider, UpstreamFailure::Status, message),
    };

    error.with_context(context)
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
