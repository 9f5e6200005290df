// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process endpoint handler

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::response::ProcessResponse;
use crate::api::errors::{ApiError, ErrorResponse};
use crate::api::http_server::AppState;
use crate::codec;
use crate::generation::types::{ImageAsset, ProcessError, ProcessResult};

/// POST /v1/process - Transform an uploaded image
///
/// Pipeline:
/// 1. Read the `file` field from the multipart upload
/// 2. Validate size and sniff the MIME type
/// 3. Run the image pipeline under the request deadline
/// 4. Map the outcome onto the wire shape: `{result, type}` for image and
///    text outcomes, a structured error body otherwise
pub async fn process_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4().to_string();

    let (bytes, declared_type) = read_upload(multipart)
        .await
        .map_err(|msg| reject(ApiError::InvalidRequest(msg), &request_id))?;

    codec::check_upload(&bytes)
        .map_err(|e| reject(ApiError::InvalidRequest(e.to_string()), &request_id))?;

    let mime_type = codec::sniff_mime_type(&bytes, declared_type.as_deref());
    info!(
        "Process request {}: {} bytes, mime={}",
        request_id,
        bytes.len(),
        mime_type
    );

    let upload = ImageAsset::new(bytes, mime_type);
    let cancel = CancellationToken::new();
    let deadline = Duration::from_secs(state.request_timeout_secs);

    let outcome = match tokio::time::timeout(
        deadline,
        state.pipeline.process(upload, cancel.clone()),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            // Deadline elapsed; make sure no backoff wait keeps the retry
            // loop alive.
            cancel.cancel();
            warn!("Process request {} hit the {:?} deadline", request_id, deadline);
            Err(ProcessError::Cancelled)
        }
    };

    match outcome {
        Ok(result) => {
            debug!("Process request {} succeeded", request_id);
            Ok(Json(ProcessResponse::from_result(result)))
        }
        // The remote call worked but produced no image; this is a normal
        // outcome and keeps the original wire shape.
        Err(ProcessError::NoImageReturned { diagnostic }) => {
            info!("Process request {} returned no image", request_id);
            Ok(Json(ProcessResponse::from_result(ProcessResult::Text(
                diagnostic.unwrap_or_else(|| "No image generated.".to_string()),
            ))))
        }
        Err(error) => {
            warn!("Process request {} failed: {}", request_id, error);
            Err(reject(map_process_error(error), &request_id))
        }
    }
}

/// Read the `file` field out of a multipart upload
async fn read_upload(mut multipart: Multipart) -> Result<(Vec<u8>, Option<String>), String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed multipart body: {}", e))?
    {
        if field.name() == Some("file") {
            let declared_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("failed to read upload: {}", e))?;
            return Ok((data.to_vec(), declared_type));
        }
    }
    Err("missing 'file' field in multipart body".to_string())
}

fn map_process_error(error: ProcessError) -> ApiError {
    match error {
        ProcessError::QuotaExhausted { guidance } => ApiError::RateLimitExceeded {
            retry_after: 60,
            message: guidance,
        },
        ProcessError::InvocationFailed { source } => ApiError::UpstreamError(source.to_string()),
        ProcessError::Cancelled => ApiError::Timeout,
        ProcessError::InternalFault(msg) => ApiError::InternalError(msg),
        // Handled before this mapping; kept for totality
        ProcessError::NoImageReturned { .. } => {
            ApiError::UpstreamError("no image generated".to_string())
        }
    }
}

fn reject(error: ApiError, request_id: &str) -> (StatusCode, Json<ErrorResponse>) {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(error.to_response(Some(request_id.to_string()))),
    )
}
