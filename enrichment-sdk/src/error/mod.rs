//! Error handling for the enrichment SDK
//!
//! This module provides the typed failure taxonomy shared by every adapter
//! and orchestrator:
//! - `Validation` for malformed caller input or normalized output
//! - `Authentication` for credential exchange failures
//! - `Upstream` for non-2xx, transport or malformed provider responses
//! - `NotFound` for semantically empty provider results
//! - `TimedOut` for async jobs that exhausted their polling budget
//!
//! Upstream and authentication failures carry an `ErrorContext` with the
//! provider id and upstream status code, never the credential itself.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::core::ProviderId;

pub mod mapping;

/// Result type for enrichment operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// What went wrong on the provider side of an `Upstream` failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Provider answered with a non-2xx status
    Status,
    /// Request never produced a response (connect, timeout, TLS)
    Transport,
    /// 2xx response whose envelope could not be decoded
    MalformedResponse,
    /// Async job reached a terminal state without a usable artifact
    JobFailed,
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::Transport => write!(f, "transport"),
            Self::MalformedResponse => write!(f, "malformed response"),
            Self::JobFailed => write!(f, "job failed"),
        }
    }
}

/// Why a polling loop stopped before the job finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    /// The maximum number of status checks was used up
    AttemptBudget,
    /// The caller's overall deadline would have been exceeded
    Deadline,
}

impl fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttemptBudget => write!(f, "attempt budget exhausted"),
            Self::Deadline => write!(f, "caller deadline reached"),
        }
    }
}

/// Main error type for the enrichment SDK
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// Caller input or normalized output out of contract
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential or token exchange failure
    #[error("Authentication error ({}): {message}", .context.provider_label())]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    /// Provider failure (status, transport, envelope or job)
    #[error("Upstream error ({}, {kind}): {message}", .context.provider_label())]
    Upstream {
        kind: UpstreamFailure,
        message: String,
        context: ErrorContext,
    },

    /// Provider understood the request but knows nothing about it
    #[error("Not found: {0}")]
    NotFound(String),

    /// Async generation did not finish in time
    #[error("Timed out waiting for {provider} job after {attempts} checks: {cause}")]
    TimedOut {
        provider: ProviderId,
        attempts: u32,
        cause: TimeoutCause,
    },

    /// No credential configured for a provider that needs one
    #[error("Missing credential for provider {0}")]
    MissingCredential(ProviderId),

    /// Invalid or incomplete process configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Create an authentication error for a provider
    pub fn authentication(provider: ProviderId, message: impl Into<String>) -> Self {
        ServiceError::Authentication {
            message: message.into(),
            context: ErrorContext::for_provider(provider),
        }
    }

    /// Create an upstream error of the given kind
    pub fn upstream(
        provider: ProviderId,
        kind: UpstreamFailure,
        message: impl Into<String>,
    ) -> Self {
        ServiceError::Upstream {
            kind,
            message: message.into(),
            context: ErrorContext::for_provider(provider),
        }
    }

    /// Create an upstream error for an envelope the adapter could not decode
    pub fn malformed(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::upstream(provider, UpstreamFailure::MalformedResponse, message)
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    /// Replace the context of an upstream/authentication error
    pub fn with_context(self, context: ErrorContext) -> Self {
        match self {
            ServiceError::Authentication { message, .. } => {
                ServiceError::Authentication { message, context }
            }
            ServiceError::Upstream { kind, message, .. } => {
                ServiceError::Upstream { kind, message, context }
            }
            other => other,
        }
    }

    /// Attribute a provider-less error (e.g. from a `From` conversion) to a provider
    pub fn for_provider(mut self, provider: ProviderId) -> Self {
        if let Some(context) = self.context_mut() {
            context.provider = Some(provider);
        }
        self
    }

    /// Record the endpoint that was called
    pub fn at_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        if let Some(context) = self.context_mut() {
            context.endpoint = Some(endpoint.into());
        }
        self
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            ServiceError::Authentication { context, .. }
            | ServiceError::Upstream { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ServiceError::Authentication { context, .. }
            | ServiceError::Upstream { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Provider the error is attributed to, if any
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            ServiceError::TimedOut { provider, .. } => Some(*provider),
            ServiceError::MissingCredential(provider) => Some(*provider),
            _ => self.context().and_then(|c| c.provider),
        }
    }

    /// Upstream HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        self.context().and_then(|c| c.status_code)
    }

    /// HTTP status a boundary handler must answer with
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::TimedOut { .. } => 408,
            ServiceError::Authentication { .. }
            | ServiceError::Upstream { .. }
            | ServiceError::MissingCredential(_)
            | ServiceError::Configuration(_) => 500,
        }
    }

    /// Whether the failure may warrant trying the next provider in an opt-in chain
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::Authentication { .. } | ServiceError::Upstream { .. }
        )
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Provider that generated the error
    pub provider: Option<ProviderId>,

    /// Time the failure was observed
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Upstream HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Provider-specific error code
    pub error_code: Option<String>,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            provider: None,
            timestamp: chrono::Utc::now(),
            status_code: None,
            error_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific provider
    pub fn for_provider(provider: ProviderId) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add an error code
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
        self
    }

    fn provider_label(&self) -> String {
        self.provider
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Convert reqwest errors to ServiceError
///
/// The provider is unknown at this point; adapters attach it with
/// `for_provider` right after the `?`.
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            UpstreamFailure::MalformedResponse
        } else if err.is_status() {
            UpstreamFailure::Status
        } else {
            UpstreamFailure::Transport
        };

        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else if err.is_connect() {
            format!("Connection error: {}", err)
        } else if err.is_decode() {
            format!("Response decode error: {}", err)
        } else {
            format!("HTTP client error: {}", err)
        };

        let mut context = ErrorContext::new();
        if let Some(status) = err.status() {
            context = context.status_code(status.as_u16());
        }

        ServiceError::Upstream {
            kind,
            message,
            context,
        }
    }
}

/// Convert serde_json errors to ServiceError
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Upstream {
            kind: UpstreamFailure::MalformedResponse,
            message: format!("JSON error: {}", err),
            context: ErrorContext::new(),
        }
    }
}
