//! Mock tests for the text lookup adapters
//!
//! These tests use WireMock to simulate Gemini, GigaChat and YandexGPT and
//! verify request shape, authentication headers and answer extraction.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{GeminiConfig, GigaChatConfig, YandexConfig};
    use crate::core::{ProviderId, TextLookup};
    use crate::error::{ServiceError, UpstreamFailure};
    use crate::models::{AccessToken, ContentQuery, ProviderCredential};
    use crate::services::gemini::GeminiLookup;
    use crate::services::gigachat::GigaChatLookup;
    use crate::services::yandex::YandexGptLookup;

    const ANSWER: &str = r#"{"title":"Дюна","year":2021,"type":"movie","rating":8.0}"#;

    fn query() -> ContentQuery {
        ContentQuery::new("Дюна").unwrap()
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    fn gemini(server: &MockServer) -> GeminiLookup {
        let config = GeminiConfig {
            base_url: server.uri(),
            ..GeminiConfig::default()
        };
        GeminiLookup::new(
            config,
            ProviderCredential::new(ProviderId::Gemini, "mock_gemini_key"),
            timeout(),
        )
        .unwrap()
    }

    fn gigachat(server: &MockServer) -> GigaChatLookup {
        let config = GigaChatConfig {
            base_url: server.uri(),
            ..GigaChatConfig::default()
        };
        GigaChatLookup::new(config, timeout()).unwrap()
    }

    fn yandex_gpt(server: &MockServer) -> YandexGptLookup {
        let config = YandexConfig {
            base_url: server.uri(),
            ..YandexConfig::new("b1gfolder")
        };
        YandexGptLookup::new(
            config,
            ProviderCredential::new(ProviderId::YandexGpt, "mock_yandex_key"),
            timeout(),
        )
        .unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::new("giga-token", Utc::now() + chrono::Duration::minutes(30))
    }

    #[tokio::test]
    async fn test_gemini_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "mock_gemini_key"))
            .and(body_string_contains("Дюна"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": ANSWER}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let raw = gemini(&mock_server).lookup(&query(), None).await.unwrap();

        assert_eq!(raw.provider, ProviderId::Gemini);
        assert_eq!(raw.text, ANSWER);
    }

    #[tokio::test]
    async fn test_gemini_blocked_answer_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&mock_server)
            .await;

        let err = gemini(&mock_server).lookup(&query(), None).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Upstream {
                kind: UpstreamFailure::MalformedResponse,
                ..
            }
        ));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_gemini_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&mock_server)
            .await;

        let err = gemini(&mock_server).lookup(&query(), None).await.unwrap_err();

        assert!(matches!(err, ServiceError::Upstream { kind: UpstreamFailure::Status, .. }));
        assert_eq!(err.status_code(), Some(429));
        assert!(err.to_string().contains("Resource has been exhausted"));
    }

    #[tokio::test]
    async fn test_gigachat_lookup_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("authorization", "Bearer giga-token"))
            .and(body_partial_json(json!({"model": "GigaChat", "max_tokens": 1000})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": ANSWER},
                    "index": 0,
                    "finish_reason": "stop"
                }],
                "model": "GigaChat:1.0.26.20",
                "object": "chat.completion"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let raw = gigachat(&mock_server)
            .lookup(&query(), Some(&token()))
            .await
            .unwrap();

        assert_eq!(raw.text, ANSWER);
    }

    #[tokio::test]
    async fn test_gigachat_requires_token() {
        let mock_server = MockServer::start().await;

        let err = gigachat(&mock_server).lookup(&query(), None).await.unwrap_err();

        assert!(matches!(err, ServiceError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_gigachat_expired_token_is_authentication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"status": 401, "message": "Token has expired"})),
            )
            .mount(&mock_server)
            .await;

        let err = gigachat(&mock_server)
            .lookup(&query(), Some(&token()))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Authentication { .. }));
        assert_eq!(err.provider(), Some(ProviderId::GigaChat));
    }

    #[tokio::test]
    async fn test_yandex_gpt_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/foundationModels/v1/completion"))
            .and(header("authorization", "Api-Key mock_yandex_key"))
            .and(header("x-folder-id", "b1gfolder"))
            .and(body_partial_json(json!({
                "modelUri": "gpt://b1gfolder/yandexgpt-lite/latest",
                "completionOptions": {"stream": false, "maxTokens": "2000"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "alternatives": [{
                        "message": {"role": "assistant", "text": ANSWER},
                        "status": "ALTERNATIVE_STATUS_FINAL"
                    }],
                    "modelVersion": "23.10.2024"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let raw = yandex_gpt(&mock_server).lookup(&query(), None).await.unwrap();

        assert_eq!(raw.provider, ProviderId::YandexGpt);
        assert_eq!(raw.text, ANSWER);
    }

    #[tokio::test]
    async fn test_yandex_gpt_missing_alternatives() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"alternatives": []}})))
            .mount(&mock_server)
            .await;

        let err = yandex_gpt(&mock_server).lookup(&query(), None).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Upstream {
                kind: UpstreamFailure::MalformedResponse,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_non_json_envelope_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;

        let err = yandex_gpt(&mock_server).lookup(&query(), None).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Upstream {
                kind: UpstreamFailure::MalformedResponse,
                ..
            }
        ));
        assert_eq!(err.provider(), Some(ProviderId::YandexGpt));
    }
}
