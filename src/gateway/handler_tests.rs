use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::constants::RERANK_STATUS_HEADER;
use crate::embedding::{
    DualEncoder, EmbeddingError, EncoderSession, MockDualEncoder, MockFailure, SessionLoader,
    StubDualEncoder,
};
use crate::gateway::{GatewayError, HandlerState, RerankRequest, create_router_with_state};
use crate::pipeline::{PipelineConfig, RerankError, RerankingPipeline};

const CANONICAL: &str = "I can help with that.";

fn scripted_encoder() -> MockDualEncoder {
    MockDualEncoder::new(2)
        .with_context_vector(vec![1.0, 0.0])
        .with_response_vector(CANONICAL, vec![0.5, 0.3])
        .with_response_vector("Ok. I can help with that.", vec![0.9, 0.1])
        .with_response_vector("Sure. I can help with that.", vec![0.9, -0.4])
}

fn router<E: DualEncoder + 'static>(encoder: E, fallback: bool) -> Router {
    let config = PipelineConfig::default()
        .with_modifiers(["Ok.", "Sure."])
        .with_encode_timeout(Duration::from_secs(5));
    let pipeline = RerankingPipeline::new(Arc::new(encoder), config).unwrap();
    create_router_with_state(HandlerState::new(pipeline, fallback))
}

fn tracker() -> Value {
    json!({
        "sender_id": "default",
        "events": [
            { "event": "action", "name": "action_listen" },
            { "event": "user", "text": "hi", "parse_data": { "intent": { "name": "greet" } } },
            { "event": "bot", "text": "hello" },
            { "event": "user", "text": "I need help" }
        ]
    })
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/nlg/rerank")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let header = response
        .headers()
        .get(RERANK_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, header, body)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_healthz() {
        let (status, header, body) = get(router(StubDualEncoder::new(8), true), "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header.as_deref(), Some("healthy"));
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_ready_with_stub() {
        let (status, _, body) = get(router(StubDualEncoder::new(8), true), "/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["components"]["encoder"], "ready");
        assert_eq!(body["components"]["encoder_mode"], "stub");
        assert_eq!(body["components"]["embedding_dim"], 8);
    }

    #[tokio::test]
    async fn test_ready_pending_before_model_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::embedding::EncoderConfig::new(dir.path().join("model"))
            .with_model_url("http://127.0.0.1:1/model");
        let encoder = crate::embedding::DialogueEncoder::load(config).unwrap();

        let (status, header, body) = get(router(encoder, true), "/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(header.as_deref(), Some("pending"));
        assert_eq!(body["components"]["encoder"], "pending");
        assert_eq!(body["components"]["encoder_mode"], "model");
    }

    struct GatedLoader {
        started: std::sync::mpsc::Sender<()>,
        proceed: parking_lot::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl SessionLoader for GatedLoader {
        type Session = StubDualEncoder;

        fn load(&self) -> Result<StubDualEncoder, EmbeddingError> {
            let _ = self.started.send(());
            let _ = self.proceed.lock().recv();
            Ok(StubDualEncoder::new(8))
        }
    }

    #[tokio::test]
    async fn test_ready_answers_pending_while_model_loads() {
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (proceed_tx, proceed_rx) = std::sync::mpsc::channel();
        let session = EncoderSession::new(GatedLoader {
            started: started_tx,
            proceed: parking_lot::Mutex::new(proceed_rx),
        });
        let pipeline =
            RerankingPipeline::new(Arc::new(session), PipelineConfig::default()).unwrap();
        let app = create_router_with_state(HandlerState::new(pipeline.clone(), true));

        let warming = tokio::spawn(async move { pipeline.warm_up().await });
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();

        let (status, header, body) =
            tokio::time::timeout(Duration::from_secs(2), get(app.clone(), "/ready"))
                .await
                .expect("/ready waited on the model load");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(header.as_deref(), Some("pending"));
        assert!(body["components"]["embedding_dim"].is_null());

        proceed_tx.send(()).unwrap();
        warming.await.unwrap().unwrap();

        let (status, _, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["components"]["embedding_dim"], 8);
    }
}

mod rerank_tests {
    use super::*;

    #[tokio::test]
    async fn test_rerank_with_text() {
        let body = json!({ "text": CANONICAL, "tracker": tracker() });

        let (status, header, body) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header.as_deref(), Some("ranked"));
        assert_eq!(body["text"], "Ok. I can help with that.");
        let ranked = body["ranked"].as_array().unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0]["origin"], 1);
        assert_eq!(ranked[2]["text"], CANONICAL);
        assert!(body.get("response").is_none());
    }

    #[tokio::test]
    async fn test_rerank_with_template() {
        let body = json!({
            "response": { "text": CANONICAL, "buttons": [{ "title": "yes", "payload": "/affirm" }] },
            "tracker": tracker()
        });

        let (status, _, body) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["text"], "Ok. I can help with that.");
        assert_eq!(body["response"]["buttons"][0]["title"], "yes");
    }

    #[tokio::test]
    async fn test_missing_text_is_bad_request() {
        let body = json!({ "tracker": tracker() });

        let (status, header, body) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(header.as_deref(), Some("invalid_request"));
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_malformed_events_are_bad_request() {
        let body = json!({ "text": CANONICAL, "tracker": { "events": "not a list" } });

        let (status, _, _) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_json_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/nlg/rerank")
            .body(Body::from("text=hello"))
            .unwrap();

        let (status, header, body) = send(router(scripted_encoder(), true), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(header.as_deref(), Some("invalid_request"));
        assert_eq!(body["kind"], "invalid_request");
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_blank_text_is_invalid_input() {
        let body = json!({ "text": "  ", "tracker": tracker() });

        let (status, header, _) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(header.as_deref(), Some("invalid_input"));
    }

    #[tokio::test]
    async fn test_empty_tracker_falls_back() {
        let body = json!({ "text": CANONICAL });

        let (status, header, body) = post_json(router(scripted_encoder(), true), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header.as_deref(), Some("fallback"));
        assert_eq!(body["text"], CANONICAL);
        assert_eq!(body["ranked"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_tracker_without_fallback_is_unprocessable() {
        let body = json!({ "text": CANONICAL, "tracker": { "events": [] } });

        let (status, header, _) = post_json(router(scripted_encoder(), false), body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(header.as_deref(), Some("insufficient_context"));
    }

    #[tokio::test]
    async fn test_model_unavailable_without_fallback() {
        let encoder = MockDualEncoder::new(2).with_failure(MockFailure::LoadFailure);
        let body = json!({ "text": CANONICAL, "tracker": tracker() });

        let (status, header, _) = post_json(router(encoder, false), body).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(header.as_deref(), Some("model_unavailable"));
    }

    #[tokio::test]
    async fn test_model_unavailable_with_fallback() {
        let encoder = MockDualEncoder::new(2).with_failure(MockFailure::LoadFailure);
        let body = json!({ "text": CANONICAL, "tracker": tracker() });

        let (status, header, body) = post_json(router(encoder, true), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header.as_deref(), Some("fallback"));
        assert_eq!(body["text"], CANONICAL);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_server_error() {
        let encoder = MockDualEncoder::new(4).with_context_vector(vec![1.0, 0.0]);
        let body = json!({ "text": CANONICAL, "tracker": tracker() });

        let (status, header, _) = post_json(router(encoder, true), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header.as_deref(), Some("embedding_dimension_mismatch"));
    }
}

mod payload_tests {
    use super::*;

    #[test]
    fn test_template_text_takes_precedence() {
        let request: RerankRequest = serde_json::from_value(json!({
            "text": "top level",
            "response": { "text": "from template" }
        }))
        .unwrap();

        assert_eq!(request.canonical_text().unwrap(), "from template");
    }

    #[test]
    fn test_template_without_text_uses_top_level() {
        let request: RerankRequest = serde_json::from_value(json!({
            "text": "top level",
            "response": { "image": "https://example.com/cat.png" }
        }))
        .unwrap();

        assert_eq!(request.canonical_text().unwrap(), "top level");
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            GatewayError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(RerankError::InsufficientContext).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GatewayError::from(RerankError::ModelUnavailable {
                reason: "down".into()
            })
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
