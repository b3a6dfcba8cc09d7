//! The analysis endpoint — one pipeline invocation per request.

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use veridex_common::ErrorKind;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AnalyzeBody {
    pub text: Option<String>,
}

pub async fn analyze(
    State(state): State<SharedState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Response {
    let text = match body {
        Ok(Json(AnalyzeBody { text: Some(text) })) => text,
        Ok(Json(AnalyzeBody { text: None })) => {
            return bad_request("Field `text` is required");
        }
        Err(rejection) => {
            return bad_request(&format!("Invalid request body: {}", rejection.body_text()));
        }
    };

    match state.service.analyze(&text).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) if err.kind == ErrorKind::ValidationError => bad_request(&err.message),
        Err(err) => {
            // Full detail stays in the log; the response carries only the
            // sanitized message.
            tracing::error!(
                kind = err.kind.as_str(),
                detail = err.detail.as_deref().unwrap_or(""),
                "analysis failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to analyze article.",
                    "message": err.message,
                })),
            )
                .into_response()
        }
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;
    use veridex_llm::backend::{
        ClassifierBackend, Completion, ProviderError, ProviderReply,
    };
    use veridex_llm::config::ProviderConfig;
    use veridex_llm::prompt::PromptSpec;
    use veridex_llm::service::AnalysisService;

    use crate::router::build_router;
    use crate::state::AppState;

    struct MockBackend {
        reply: fn() -> Result<ProviderReply, ProviderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClassifierBackend for MockBackend {
        async fn classify(
            &self,
            _spec: &PromptSpec,
            _model: Option<&str>,
        ) -> Result<ProviderReply, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }
        fn is_local(&self) -> bool {
            true
        }
    }

    fn app_with(
        reply: fn() -> Result<ProviderReply, ProviderError>,
    ) -> (axum::Router, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend { reply, calls: AtomicUsize::new(0) });
        let service = AnalysisService::new(backend.clone(), &ProviderConfig::default());
        let app = build_router(AppState {
            service,
            environment: "test".to_string(),
            api_key_configured: true,
        });
        (app, backend)
    }

    fn post_analyze(json_body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_text_returns_result_json() {
        let (app, _) = app_with(|| {
            Ok(ProviderReply::SingleCompletion(Completion {
                content: r#"{"label":"Real","confidence":0.91,"reasoning":"Cites a journal and specific finding."}"#
                    .to_string(),
                model: "mock-model".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }))
        });

        let resp = app
            .oneshot(post_analyze(
                r#"{"text":"Scientists discovered a new coral species near Japan, published in a peer-reviewed journal."}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["label"], "Real");
        assert_eq!(json["confidence"], 0.91);
        assert_eq!(json["reasoning"], "Cites a journal and specific finding.");
    }

    #[tokio::test]
    async fn test_short_text_is_400_and_never_reaches_the_provider() {
        let (app, backend) = app_with(|| Err(ProviderError::EmptyReply));

        let resp = app.oneshot(post_analyze(r#"{"text":"hi"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("10 characters"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_text_field_is_400() {
        let (app, _) = app_with(|| Err(ProviderError::EmptyReply));

        let resp = app.oneshot(post_analyze(r#"{}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Field `text` is required");
    }

    #[tokio::test]
    async fn test_provider_timeout_is_500_with_message() {
        let (app, _) = app_with(|| Err(ProviderError::Timeout(30)));

        let resp = app
            .oneshot(post_analyze(r#"{"text":"a perfectly reasonable news article"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Failed to analyze article.");
        assert!(!json["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_reports_credentials_and_environment() {
        let (app, _) = app_with(|| Err(ProviderError::EmptyReply));

        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["environment"], "test");
        assert_eq!(json["api_key_configured"], true);
    }

    #[tokio::test]
    async fn test_missing_key_still_serves_health_and_fails_analysis_cleanly() {
        // Default config has no API key; the router must still come up,
        // report the credential gap on /, and resolve /analyze with a
        // structured auth failure instead of refusing to start.
        let provider = ProviderConfig::default();
        let service = AnalysisService::new(provider.build_backend().unwrap(), &provider);
        let app = build_router(AppState {
            service,
            environment: "test".to_string(),
            api_key_configured: false,
        });

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["api_key_configured"], false);

        let resp = app
            .oneshot(post_analyze(r#"{"text":"a perfectly reasonable news article"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(!json["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let (app, _) = app_with(|| Err(ProviderError::EmptyReply));

        let resp = app
            .oneshot(Request::builder().uri("/test123").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Route not found");
    }
}
