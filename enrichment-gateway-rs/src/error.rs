//! JSON error responses for the HTTP boundary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use enrichment_sdk::{ProviderId, ServiceError};

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Orchestrator failure on its way to the caller
#[derive(Debug)]
pub struct ApiError {
    error: ServiceError,
    query: Option<String>,
}

impl ApiError {
    /// Attach the search query, echoed back in 404 bodies
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> ErrorResponse {
        match (&self.error, &self.query) {
            (ServiceError::NotFound(_), Some(query)) => ErrorResponse {
                error: "Content not found".to_string(),
                provider: None,
                upstream_status: None,
                query: Some(query.clone()),
            },
            (ServiceError::Validation(message), _) => ErrorResponse {
                error: message.clone(),
                provider: None,
                upstream_status: None,
                query: None,
            },
            (error, _) => ErrorResponse {
                error: error.to_string(),
                provider: error.provider(),
                upstream_status: error.status_code(),
                query: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self { error, query: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed with {}: {}", status.as_u16(), self.error);
        } else {
            log::info!("Request rejected with {}: {}", status.as_u16(), self.error);
        }
        (status, Json(self.body())).into_response()
    }
}

/// 405 for any method a route does not serve
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".to_string(),
            provider: None,
            upstream_status: None,
            query: None,
        }),
    )
        .into_response()
}
