//! Functional tests for the edit endpoint

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use retouch_proxy::config::Settings;
use retouch_proxy::error::{AppError, Result};
use retouch_proxy::model::reply::{BlockSignal, InlineImage, ModelReply, ReplyCandidate};
use retouch_proxy::model::traits::{ImageModel, ImagePayload};
use retouch_proxy::response::data_url;
use retouch_proxy::{api, AppState};

enum StubOutcome {
    Reply(ModelReply),
    RateLimited,
}

/// Counting stub for the model boundary; records the last instruction so
/// tests can observe what the endpoint actually sent.
struct StubModel {
    calls: AtomicUsize,
    last_instruction: Mutex<Option<String>>,
    outcome: StubOutcome,
}

impl StubModel {
    fn returning(reply: ModelReply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_instruction: Mutex::new(None),
            outcome: StubOutcome::Reply(reply),
        })
    }

    fn rate_limited() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_instruction: Mutex::new(None),
            outcome: StubOutcome::RateLimited,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for StubModel {
    async fn generate(&self, _image: ImagePayload, instruction: &str) -> Result<ModelReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_instruction.lock().unwrap() = Some(instruction.to_string());
        match &self.outcome {
            StubOutcome::Reply(reply) => Ok(reply.clone()),
            StubOutcome::RateLimited => Err(AppError::RateLimited),
        }
    }
}

fn png_reply() -> ModelReply {
    ModelReply {
        block: None,
        candidates: vec![ReplyCandidate {
            image: Some(InlineImage {
                mime_type: "image/png".into(),
                data: "QQ==".into(),
            }),
            finish_reason: Some("STOP".into()),
        }],
        text_feedback: None,
    }
}

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.model.api_key = "test-key".into();
    settings.rate_limit.enabled = false;
    settings
}

fn test_app(settings: Settings, model: Arc<StubModel>) -> Router {
    api::routes::create_router(Arc::new(AppState { settings, model }))
}

fn post_edit(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/edits")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn small_image_data_url() -> String {
    data_url::encode(&[1, 2, 3, 4], "image/png")
}

#[tokio::test]
async fn test_adjust_returns_image_url() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "adjust",
            "prompt": "Warmer Lighting",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["imageUrl"], "data:image/png;base64,QQ==");
    assert_eq!(model.call_count(), 1);

    let instruction = model.last_instruction.lock().unwrap().clone().unwrap();
    assert!(instruction.contains("\"Warmer Lighting\""));
}

#[tokio::test]
async fn test_edit_forwards_hotspot_coordinates() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "edit",
            "prompt": "remove the lamp",
            "hotspot": { "x": 12, "y": 34 },
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let instruction = model.last_instruction.lock().unwrap().clone().unwrap();
    assert!(instruction.contains("\"remove the lamp\""));
    assert!(instruction.contains("x: 12"));
    assert!(instruction.contains("y: 34"));
}

#[tokio::test]
async fn test_missing_prompt_is_rejected_before_model_call() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "adjust",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("prompt"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_blank_prompt_counts_as_missing() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "adjust",
            "prompt": "   ",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "rotate",
            "prompt": "spin it",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("rotate"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_edit_without_hotspot_is_rejected() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "edit",
            "prompt": "remove the lamp",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("hotspot"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_hotspot_on_filter_is_rejected() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "filter",
            "prompt": "1970s film look",
            "hotspot": { "x": 1, "y": 1 },
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_image_one_byte_over_limit_is_rejected() {
    let mut settings = test_settings();
    settings.limits.max_image_bytes = 16;

    let model = StubModel::returning(png_reply());
    let app = test_app(settings, model.clone());

    let oversize = data_url::encode(&[0u8; 17], "image/png");
    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": oversize,
            "action": "adjust",
            "prompt": "warmer",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("too large"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_image_exactly_at_limit_is_accepted() {
    let mut settings = test_settings();
    settings.limits.max_image_bytes = 16;

    let model = StubModel::returning(png_reply());
    let app = test_app(settings, model.clone());

    let at_limit = data_url::encode(&[0u8; 16], "image/png");
    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": at_limit,
            "action": "adjust",
            "prompt": "warmer",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_wrong_method_gets_canonical_405() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/edits")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("POST"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/edits")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_blocked_reply_preempts_image_data() {
    let mut reply = png_reply();
    reply.block = Some(BlockSignal {
        reason: "SAFETY".into(),
        message: None,
    });

    let model = StubModel::returning(reply);
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "adjust",
            "prompt": "warmer",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("SAFETY"));
}

#[tokio::test]
async fn test_model_rate_limit_maps_to_429() {
    let model = StubModel::rate_limited();
    let app = test_app(test_settings(), model.clone());

    let response = app
        .oneshot(post_edit(json!({
            "imageDataUrl": small_image_data_url(),
            "action": "adjust",
            "prompt": "warmer",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Rate limit"));
}

#[tokio::test]
async fn test_health_endpoint_responds() {
    let model = StubModel::returning(png_reply());
    let app = test_app(test_settings(), model);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
