// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::process::process_handler;
use crate::codec::MAX_UPLOAD_SIZE;
use crate::config::NodeConfig;
use crate::pipeline::ImagePipeline;

/// Headroom on top of the upload cap for multipart framing
const BODY_LIMIT: usize = MAX_UPLOAD_SIZE + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImagePipeline>,
    pub request_timeout_secs: u64,
}

pub async fn start_server(config: &NodeConfig, pipeline: Arc<ImagePipeline>) -> anyhow::Result<()> {
    let state = AppState {
        pipeline,
        request_timeout_secs: config.request_timeout_secs,
    };

    let app = build_router(state, &config.allowed_origin)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router; separate from `start_server` so tests can
/// drive it without binding a socket.
pub fn build_router(state: AppState, allowed_origin: &str) -> anyhow::Result<Router> {
    let cors = if allowed_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentials cannot be combined with wildcard methods/headers, so
        // the specific-origin branch lists them explicitly.
        CorsLayer::new()
            .allow_origin(allowed_origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    Ok(Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Image transformation endpoint
        .route("/v1/process", post(process_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
