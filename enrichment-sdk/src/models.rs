//! Data model shared by adapters, orchestrators and the HTTP boundary

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::to_chrono;
use crate::core::ProviderId;
use crate::error::{Result, ServiceError};

/// Free-form title or name to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    text: String,
}

impl ContentQuery {
    /// Trim and validate a caller query
    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ServiceError::validation("Query parameter is required"));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Catalog content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
    Tv,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
            ContentType::Tv => "tv",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            "tv" => Ok(ContentType::Tv),
            other => Err(ServiceError::validation(format!(
                "Unsupported content type '{}', expected movie, series or tv",
                other
            ))),
        }
    }
}

/// Normalized lookup result
///
/// Only the ResponseNormalizer builds one, so every instance satisfies
/// `0 <= rating <= 10` and `1900 <= year <= 2100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResult {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub rating: f64,
    pub year: i32,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// English poster description suitable as an image prompt
    #[serde(rename = "image_suggestion")]
    pub poster_prompt_hint: String,
}

/// Opaque secret bound to one provider
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    provider: ProviderId,
    secret: String,
}

impl ProviderCredential {
    pub fn new(provider: ProviderId, secret: impl Into<String>) -> Self {
        Self {
            provider,
            secret: secret.into(),
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Raw secret, for building an auth header only
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Short-lived bearer token issued by a provider's OAuth endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable at `now` with `margin` to spare before expiry
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now + to_chrono(margin) < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Unparsed text answer of a text provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProviderResponse {
    pub provider: ProviderId,
    pub text: String,
}

impl RawProviderResponse {
    pub fn new(provider: ProviderId, text: impl Into<String>) -> Self {
        Self {
            provider,
            text: text.into(),
        }
    }
}

/// Where the poster bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Base64(String),
    Url(String),
}

/// Generated poster, identical for inline and polled providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterImage {
    pub mime_type: String,
    pub source: ImageSource,
}

impl PosterImage {
    pub fn base64(mime_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source: ImageSource::Base64(payload.into()),
        }
    }

    pub fn url(mime_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source: ImageSource::Url(url.into()),
        }
    }

    pub fn external_url(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Url(url) => Some(url),
            ImageSource::Base64(_) => None,
        }
    }

    pub fn base64_payload(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Base64(payload) => Some(payload),
            ImageSource::Url(_) => None,
        }
    }
}

/// Poster generation input as received from the caller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PosterRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub image_suggestion: Option<String>,
}

impl PosterRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn image_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.image_suggestion = Some(suggestion.into());
        self
    }

    /// Trim every field, drop blank optionals and require a title
    pub fn validate(self) -> Result<Self> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }

        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            title,
            description: clean(self.description),
            genre: clean(self.genre),
            image_suggestion: clean(self.image_suggestion),
        })
    }

    /// Precomputed prompt from an earlier lookup, if non-blank
    pub fn image_hint(&self) -> Option<&str> {
        self.image_suggestion
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }
}

/// Job id returned by an async image provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncHandle {
    pub provider: ProviderId,
    pub job_id: String,
}

/// Lifecycle of a poster generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Polling,
    Done,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::TimedOut)
    }
}

/// State of one generation, owned by the orchestration call that created it
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub id: String,
    pub provider: ProviderId,
    pub status: JobStatus,
    /// Status checks issued so far
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub result: Option<PosterImage>,
}

impl GenerationJob {
    pub fn submitted(id: impl Into<String>, provider: ProviderId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            provider,
            status: JobStatus::Submitted,
            attempt: 0,
            created_at,
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_query_trims_and_rejects_blank() {
        assert_eq!(ContentQuery::new("  Дюна ").unwrap().text(), "Дюна");
        let err = ContentQuery::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Query parameter is required");
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("Series".parse::<ContentType>().unwrap(), ContentType::Series);
        assert_eq!(" TV ".parse::<ContentType>().unwrap(), ContentType::Tv);
        assert!(matches!(
            "cartoon".parse::<ContentType>(),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_content_result_wire_names() {
        let result = ContentResult {
            title: "X".to_string(),
            description: String::new(),
            genre: String::new(),
            rating: 7.5,
            year: 2020,
            content_type: ContentType::Movie,
            poster_prompt_hint: "hint".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "movie");
        assert_eq!(json["image_suggestion"], "hint");
        assert_eq!(json["rating"], 7.5);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let credential = ProviderCredential::new(ProviderId::OpenAI, "sk-live-123");
        assert!(!format!("{:?}", credential).contains("sk-live-123"));

        let token = AccessToken::new("eyJ.token", Utc::now());
        assert!(!format!("{:?}", token).contains("eyJ.token"));
    }

    #[test]
    fn test_access_token_freshness_margin() {
        let now = Utc::now();
        let token = AccessToken::new("t", now + chrono::Duration::seconds(90));
        assert!(token.is_fresh(now, Duration::from_secs(60)));
        assert!(!token.is_fresh(now, Duration::from_secs(90)));
        assert!(!token.is_fresh(now + chrono::Duration::seconds(31), Duration::from_secs(60)));
    }

    #[test]
    fn test_poster_request_validate() {
        let request = PosterRequest::new("  Alien ")
            .description(" ")
            .genre(" horror ")
            .validate()
            .unwrap();
        assert_eq!(request.title, "Alien");
        assert_eq!(request.description, None);
        assert_eq!(request.genre.as_deref(), Some("horror"));

        let err = PosterRequest::new(" ").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Title is required");
    }

    #[test]
    fn test_image_hint_ignores_blank() {
        assert_eq!(PosterRequest::new("A").image_suggestion("  ").image_hint(), None);
        assert_eq!(
            PosterRequest::new("A").image_suggestion("dark alley").image_hint(),
            Some("dark alley")
        );
    }
}
