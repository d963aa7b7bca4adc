//! Wire-level tests for the Gemini client against a local HTTP server.

mod common;

#[cfg(all(test, feature = "gemini"))]
mod gemini_client_tests {
    use super::common::{
        SAMPLE_CHECKLIST, SAMPLE_CHECKLIST_PRETTY, direct_http_client, full_profile, serve_once,
        sse_text_event,
    };
    use appointment_checklist::{
        ChecklistError, ChecklistGenerator, GeminiClient, GenerationService, PatientProfile,
        TokenUsage, build_checklist_prompt,
    };
    use serde_json::json;

    const SSE: &str = "text/event-stream";

    fn api_key_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-key")
            .unwrap()
            .http_client(direct_http_client(None))
            .base_url(base_url)
    }

    #[tokio::test]
    async fn test_streamed_checklist_is_parsed() {
        let (first, second) = SAMPLE_CHECKLIST.split_at(40);
        let body = format!("{}{}", sse_text_event(first), sse_text_event(second));
        // split the HTTP body mid-event as well
        let bytes = body.into_bytes();
        let (a, b) = bytes.split_at(25);
        let (base_url, _request) = serve_once("200 OK", SSE, vec![a.to_vec(), b.to_vec()]).await;

        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        let result = generator.generate(&full_profile()).await.unwrap();

        assert_eq!(result.to_json_string(), SAMPLE_CHECKLIST_PRETTY);
    }

    #[tokio::test]
    async fn test_request_carries_prompt_config_and_key() {
        let body = sse_text_event("{}");
        let (base_url, request) = serve_once("200 OK", SSE, vec![body.into_bytes()]).await;

        let profile = full_profile();
        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        generator.generate(&profile).await.unwrap();

        let request = request.await.unwrap();
        assert!(
            request
                .request_line
                .starts_with("POST /models/gemini-2.0-flash-001:streamGenerateContent?alt=sse&key=test-key "),
            "unexpected request line: {}",
            request.request_line
        );
        assert!(request.header("authorization").is_none());

        let body = request.json();
        assert_eq!(body["contents"][0]["role"], json!("user"));
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            json!(build_checklist_prompt(&profile))
        );
        assert_eq!(body["generationConfig"]["temperature"], json!(1.0));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(8192));
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["TEXT"]));
        assert_eq!(
            body["safetySettings"],
            json!([
                {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "OFF"}
            ])
        );
    }

    #[tokio::test]
    async fn test_vertex_client_sends_bearer_token() {
        let body = sse_text_event("{}");
        let (base_url, request) = serve_once("200 OK", SSE, vec![body.into_bytes()]).await;

        let client = GeminiClient::vertex("my-project", "us-central1", "ya29.token")
            .unwrap()
            .http_client(direct_http_client(None))
            .base_url(format!("{}/", base_url));
        ChecklistGenerator::new(client)
            .generate(&PatientProfile::new())
            .await
            .unwrap();

        let request = request.await.unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer ya29.token"));
        assert!(
            request
                .request_line
                .starts_with("POST /models/gemini-2.0-flash-001:streamGenerateContent?alt=sse ")
        );
    }

    #[tokio::test]
    async fn test_invalid_model_text_is_reported_as_data() {
        let body = format!("{}{}", sse_text_event("Sure! Here is "), sse_text_event("your checklist"));
        let (base_url, _request) = serve_once("200 OK", SSE, vec![body.into_bytes()]).await;

        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        let result = generator.generate(&PatientProfile::new()).await.unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "error": "Could not generate a valid checklist",
                "raw_response": "Sure! Here is your checklist"
            })
        );
    }

    #[tokio::test]
    async fn test_usage_trailer_is_reported() {
        let trailer = json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 310, "candidatesTokenCount": 190},
            "modelVersion": "gemini-2.0-flash-001"
        });
        let body = format!("{}data: {}\n\n", sse_text_event("{\"a\":1}"), trailer);
        let (base_url, _request) = serve_once("200 OK", SSE, vec![body.into_bytes()]).await;

        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        let report = generator
            .generate_with_metadata(&PatientProfile::new())
            .await
            .unwrap();

        assert_eq!(report.raw_response, "{\"a\":1}");
        assert_eq!(report.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(
            report.usage,
            Some(TokenUsage::new("gemini-2.0-flash-001", 310, 190))
        );
    }

    #[tokio::test]
    async fn test_http_error_status_is_a_fault() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let (base_url, _request) = serve_once(
            "429 Too Many Requests",
            "application/json",
            vec![body.as_bytes().to_vec()],
        )
        .await;

        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        let err = generator.generate(&full_profile()).await.unwrap_err();

        match err {
            ChecklistError::ApiError(msg) => {
                assert!(msg.contains("429"), "message: {}", msg);
                assert!(msg.contains("Quota exceeded"), "message: {}", msg);
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_event_mid_stream_is_a_fault() {
        let error_event = json!({"error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}});
        let body = format!("{}data: {}\n\n", sse_text_event("{\"intro"), error_event);
        let (base_url, _request) = serve_once("200 OK", SSE, vec![body.into_bytes()]).await;

        let generator = ChecklistGenerator::new(api_key_client(&base_url));
        let err = generator.generate(&PatientProfile::new()).await.unwrap_err();

        assert_eq!(
            err,
            ChecklistError::ApiError("Gemini API error (INTERNAL): Internal error".to_string())
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_fault() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let generator =
            ChecklistGenerator::new(api_key_client(&format!("http://{}", addr)));
        let err = generator.generate(&PatientProfile::new()).await.unwrap_err();

        assert!(
            matches!(err, ChecklistError::HttpError(_)),
            "Expected HttpError, got {:?}",
            err
        );
    }

    #[test]
    fn test_empty_credentials_are_rejected() {
        assert!(matches!(
            GeminiClient::new(""),
            Err(ChecklistError::ConfigError(_))
        ));
        assert!(matches!(
            GeminiClient::vertex("project", "us-central1", ""),
            Err(ChecklistError::ConfigError(_))
        ));
        assert!(matches!(
            GeminiClient::vertex("", "us-central1", "token"),
            Err(ChecklistError::ConfigError(_))
        ));
    }

    #[test]
    fn test_generator_debug_redacts_credentials() {
        let generator = ChecklistGenerator::new(GeminiClient::new("live-key-123").unwrap());
        let debug = format!("{:?}", generator);

        assert!(debug.contains("GeminiClient"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("live-key-123"));
    }

    #[test]
    fn test_provider_name() {
        let client = GeminiClient::new("key").unwrap();
        assert_eq!(client.provider_name(), "Gemini");
    }
}
