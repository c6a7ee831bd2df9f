//! HTTP boundary for the enrichment orchestrators
//!
//! Exposes text lookup and poster generation over JSON:
//!
//! - `GET  /api/v1/search?query=...` resolves a title to a `ContentResult`
//! - `POST /api/v1/poster` generates a poster image
//! - `OPTIONS` on both answers the CORS preflight, other methods get 405
//! - `GET  /health` reports uptime and the configured providers

pub mod error;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use enrichment_sdk::{
    ContentQuery, ContentResult, Enrichment, ImageGenerationOrchestrator, PosterRequest,
    ProviderId, ServiceError, TextSearchOrchestrator,
};

pub use error::{ApiError, ErrorResponse};

/// Poster requests carry a few short strings
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Default wall-clock budget for one poster request
pub const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(90);

/// How long browsers may cache a preflight answer
pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    text: Arc<TextSearchOrchestrator>,
    images: Arc<ImageGenerationOrchestrator>,
    request_budget: Duration,
    started_at: Instant,
}

impl AppState {
    pub fn new(text: Arc<TextSearchOrchestrator>, images: Arc<ImageGenerationOrchestrator>) -> Self {
        Self {
            text,
            images,
            request_budget: DEFAULT_REQUEST_BUDGET,
            started_at: Instant::now(),
        }
    }

    pub fn from_enrichment(enrichment: &Enrichment) -> Self {
        Self::new(enrichment.text.clone(), enrichment.images.clone())
    }

    /// Deadline handed to the poll loop, measured from request arrival
    pub fn with_request_budget(mut self, budget: Duration) -> Self {
        self.request_budget = budget;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PosterResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    pub mime_type: String,
    pub title: String,
    pub prompt: String,
    pub provider: ProviderId,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub status: String,
    pub text_providers: Vec<ProviderId>,
    pub image_provider: ProviderId,
}

/// Build the router with CORS and payload limits applied
///
/// The CORS layer answers every `OPTIONS` request itself, so the
/// per-route method fallbacks only ever see the remaining verbs.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/search",
            get(search_handler).fallback(error::method_not_allowed),
        )
        .route(
            "/api/v1/poster",
            post(poster_handler).fallback(error::method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
        .layer(cors)
        .with_state(state)
}

/// GET /api/v1/search - resolve a title with the configured text provider
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ContentResult>, ApiError> {
    let raw = params.query.unwrap_or_default();
    let query = ContentQuery::new(&raw)?;

    log::info!("Search request: query='{}'", query.text());

    let result = state
        .text
        .resolve(&query)
        .await
        .map_err(|e| ApiError::from(e).with_query(query.text()))?;

    Ok(Json(result))
}

/// POST /api/v1/poster - generate a poster, polling async providers
async fn poster_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PosterResponse>, ApiError> {
    let request: PosterRequest = if body.iter().all(u8::is_ascii_whitespace) {
        PosterRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::validation(format!("Invalid JSON body: {}", e)))?
    };

    let title = request.title.trim().to_string();
    let deadline = chrono::Utc::now()
        + chrono::Duration::from_std(state.request_budget)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_REQUEST_BUDGET.as_secs() as i64));

    log::info!("Poster request: title='{}'", title);

    let generation = state.images.generate(request, Some(deadline)).await?;

    Ok(Json(PosterResponse {
        image_url: generation.image.external_url().map(str::to_string),
        image_base64: generation.image.base64_payload().map(str::to_string),
        mime_type: generation.image.mime_type.clone(),
        title,
        prompt: generation.prompt,
        provider: generation.provider,
    }))
}

/// GET /health - liveness and provider selection
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        service_name: "enrichment-gateway".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        status: "SERVING".to_string(),
        text_providers: state.text.providers(),
        image_provider: state.images.provider(),
    })
}
