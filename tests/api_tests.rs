// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API tests driving the router directly

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use reimage_node::api::{build_router, AppState, ErrorResponse, ProcessResponse};
use reimage_node::codec;
use reimage_node::generation::{
    GenerationError, GenerationRequest, GenerationResponse, GenerationStrategy, ResponsePart,
    RetryPolicy,
};
use reimage_node::pipeline::ImagePipeline;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";
const JPEG_STUB: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x00, 0x00, 0x00, 0x00, 0xD9];

/// Mock strategy returning the same outcome on every call
struct FixedStrategy {
    outcome: Result<Vec<ResponsePart>, u16>,
}

#[async_trait]
impl GenerationStrategy for FixedStrategy {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        match &self.outcome {
            Ok(parts) => Ok(GenerationResponse {
                model: "mock-model".to_string(),
                parts: parts.clone(),
            }),
            Err(429) => Err(GenerationError::RateLimited {
                retry_after_secs: 60,
            }),
            Err(status) => Err(GenerationError::ApiError {
                status: *status,
                message: "upstream rejected the request".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn app(outcome: Result<Vec<ResponsePart>, u16>) -> axum::Router {
    // Single-attempt policy keeps rate-limit tests free of backoff waits
    let pipeline = Arc::new(ImagePipeline::new(
        Arc::new(FixedStrategy { outcome }),
        RetryPolicy {
            max_attempts: 1,
            initial_delay: Duration::from_secs(5),
            multiplier: 2,
        },
    ));
    let state = AppState {
        pipeline,
        request_timeout_secs: 30,
    };
    build_router(state, "*").unwrap()
}

fn multipart_upload(bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/v1/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(Ok(vec![]));
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
    let body: serde_json::Value = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_process_returns_generated_image() {
    let app = app(Ok(vec![ResponsePart::InlineData {
        mime_type: "image/jpeg".to_string(),
        data: JPEG_STUB.to_vec(),
    }]));

    let response = app.oneshot(multipart_upload(&JPEG_STUB)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ProcessResponse = response_json(response).await;
    assert_eq!(body.kind, "image");
    assert_eq!(body.result, codec::encode(&JPEG_STUB));
}

#[tokio::test]
async fn test_process_no_image_returns_text_diagnostic() {
    let app = app(Ok(vec![ResponsePart::Text(
        "The subject could not be isolated.".to_string(),
    )]));

    let response = app.oneshot(multipart_upload(&JPEG_STUB)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ProcessResponse = response_json(response).await;
    assert_eq!(body.kind, "text");
    assert_eq!(body.result, "The subject could not be isolated.");
}

#[tokio::test]
async fn test_process_quota_exhausted_returns_429() {
    let app = app(Err(429));

    let response = app.oneshot(multipart_upload(&JPEG_STUB)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "rate_limit_exceeded");
    assert_eq!(body.retry_after, Some(60));
    assert!(body.request_id.is_some());
}

#[tokio::test]
async fn test_process_upstream_failure_returns_502() {
    let app = app(Err(500));

    let response = app.oneshot(multipart_upload(&JPEG_STUB)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "upstream_error");
    assert!(body.message.contains("upstream rejected"));
}

#[tokio::test]
async fn test_process_missing_file_field_returns_400() {
    let app = app(Ok(vec![]));

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         hello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/v1/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "invalid_request");
    assert!(body.message.contains("file"));
}

#[tokio::test]
async fn test_process_empty_upload_returns_400() {
    let app = app(Ok(vec![]));

    let response = app.oneshot(multipart_upload(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "invalid_request");
}
