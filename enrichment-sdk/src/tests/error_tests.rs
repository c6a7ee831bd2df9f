//! Tests for error handling functionality
//!
//! These tests verify the failure taxonomy, its HTTP status mapping and the
//! mapping of provider error envelopes.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::core::ProviderId;
    use crate::error::mapping::{classify_http_error, extract_error_message, map_http_error};
    use crate::error::{ErrorContext, ServiceError, TimeoutCause, UpstreamFailure};

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ServiceError::validation("bad year").http_status(), 400);
        assert_eq!(ServiceError::not_found("nothing").http_status(), 404);
        assert_eq!(
            ServiceError::authentication(ProviderId::GigaChat, "denied").http_status(),
            500
        );
        assert_eq!(
            ServiceError::upstream(ProviderId::Gemini, UpstreamFailure::Status, "boom").http_status(),
            500
        );
        assert_eq!(
            ServiceError::TimedOut {
                provider: ProviderId::YandexArt,
                attempts: 30,
                cause: TimeoutCause::AttemptBudget,
            }
            .http_status(),
            408
        );
        assert_eq!(ServiceError::MissingCredential(ProviderId::OpenAI).http_status(), 500);
        assert_eq!(ServiceError::configuration("x").http_status(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::upstream(ProviderId::Stability, UpstreamFailure::JobFailed, "no image");
        assert_eq!(err.to_string(), "Upstream error (stability, job failed): no image");

        let err = ServiceError::TimedOut {
            provider: ProviderId::YandexArt,
            attempts: 12,
            cause: TimeoutCause::Deadline,
        };
        assert_eq!(
            err.to_string(),
            "Timed out waiting for yandex-art job after 12 checks: caller deadline reached"
        );
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::for_provider(ProviderId::OpenAI)
            .status_code(429)
            .request_id("req-123")
            .endpoint("images/generations")
            .with("attempt", 1);

        let err = ServiceError::upstream(ProviderId::OpenAI, UpstreamFailure::Status, "slow down")
            .with_context(context);

        assert_eq!(err.provider(), Some(ProviderId::OpenAI));
        assert_eq!(err.status_code(), Some(429));
        let ctx = err.context().unwrap();
        assert_eq!(ctx.request_id.as_deref(), Some("req-123"));
        assert_eq!(ctx.data.get("attempt").map(String::as_str), Some("1"));

        // context is ignored for variants that carry none
        let plain = ServiceError::validation("x").with_context(ErrorContext::new());
        assert!(plain.context().is_none());
    }

    #[test]
    fn test_for_provider_attributes_converted_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ServiceError::from(json_err).for_provider(ProviderId::Gemini);

        assert!(matches!(
            err,
            ServiceError::Upstream {
                kind: UpstreamFailure::MalformedResponse,
                ..
            }
        ));
        assert_eq!(err.provider(), Some(ProviderId::Gemini));
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(ServiceError::authentication(ProviderId::GigaChat, "x").is_provider_failure());
        assert!(ServiceError::malformed(ProviderId::Gemini, "x").is_provider_failure());
        assert!(!ServiceError::not_found("x").is_provider_failure());
        assert!(!ServiceError::validation("x").is_provider_failure());
    }

    #[test]
    fn test_map_http_error_openai_envelope() {
        let body = r#"{"error":{"message":"Invalid prompt","type":"invalid_request_error","code":"content_policy_violation"}}"#;
        let err = map_http_error(ProviderId::OpenAI, StatusCode::BAD_REQUEST, body);

        match &err {
            ServiceError::Upstream { kind, message, context } => {
                assert_eq!(*kind, UpstreamFailure::Status);
                assert_eq!(message, "Invalid prompt");
                assert_eq!(context.status_code, Some(400));
                assert_eq!(context.error_code.as_deref(), Some("content_policy_violation"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_map_http_error_unauthorized_is_authentication() {
        let err = map_http_error(
            ProviderId::GigaChat,
            StatusCode::UNAUTHORIZED,
            r#"{"status":401,"message":"Token has expired"}"#,
        );
        assert!(matches!(err, ServiceError::Authentication { .. }));
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("Token has expired"));
    }

    #[test]
    fn test_map_http_error_plain_body_is_sanitized() {
        let err = map_http_error(
            ProviderId::YandexGpt,
            StatusCode::BAD_GATEWAY,
            "upstream said Api-Key AQVN-leaked",
        );
        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(!text.contains("AQVN-leaked"));
    }

    #[test]
    fn test_extract_error_message_shapes() {
        let yandex: serde_json::Value =
            serde_json::from_str(r#"{"error":{"httpCode":400,"message":"folder not found"}}"#).unwrap();
        assert_eq!(extract_error_message(&yandex).as_deref(), Some("folder not found"));

        let stability: serde_json::Value =
            serde_json::from_str(r#"{"id":"x","name":"bad_request","message":"invalid engine"}"#).unwrap();
        assert_eq!(extract_error_message(&stability).as_deref(), Some("invalid engine"));

        let plain: serde_json::Value = serde_json::from_str(r#"{"error":"quota"}"#).unwrap();
        assert_eq!(extract_error_message(&plain).as_deref(), Some("quota"));
    }

    #[test]
    fn test_classify_http_error() {
        assert_eq!(classify_http_error(StatusCode::UNAUTHORIZED), "authentication");
        assert_eq!(classify_http_error(StatusCode::TOO_MANY_REQUESTS), "rate_limit");
        assert_eq!(classify_http_error(StatusCode::SERVICE_UNAVAILABLE), "server");
    }
}
