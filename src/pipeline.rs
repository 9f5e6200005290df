// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request orchestration of the image transformation pipeline
//!
//! One request moves through: upload captured, strategy invoked under the
//! retry policy, payload extracted, result encoded. All state is request
//! local; the strategy handle is the only shared dependency and is injected
//! at construction.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::generation::extract;
use crate::generation::prompts;
use crate::generation::retry::{invoke_with_retry, RetryPolicy};
use crate::generation::strategy::GenerationStrategy;
use crate::generation::types::{
    GenerationError, GenerationRequest, ImageAsset, ProcessError, ProcessResult,
};

/// Orchestrates one image transformation request end to end
pub struct ImagePipeline {
    strategy: Arc<dyn GenerationStrategy>,
    policy: RetryPolicy,
}

impl ImagePipeline {
    pub fn new(strategy: Arc<dyn GenerationStrategy>, policy: RetryPolicy) -> Self {
        Self { strategy, policy }
    }

    /// Get the active strategy name
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Transform one uploaded image.
    ///
    /// Pipeline:
    /// 1. Build the generation request with the fixed instruction template
    /// 2. Invoke the strategy under the retry policy
    /// 3. Extract the first binary part from the response
    /// 4. Encode the payload for transport
    ///
    /// Cancelling `cancel` while a backoff wait is in progress abandons the
    /// remaining retries.
    pub async fn process(
        &self,
        upload: ImageAsset,
        cancel: CancellationToken,
    ) -> Result<ProcessResult, ProcessError> {
        debug!(
            "Processing upload: {} bytes, mime={}, strategy={}",
            upload.bytes.len(),
            upload.mime_type,
            self.strategy.name()
        );

        let request = GenerationRequest {
            prompt: prompts::EDIT_PROMPT.to_string(),
            image: upload,
        };

        let response = invoke_with_retry(&self.policy, &cancel, || {
            self.strategy.generate(&request)
        })
        .await
        .map_err(|e| match e {
            GenerationError::QuotaExhausted { attempts } => {
                warn!("Generation quota exhausted after {} attempts", attempts);
                ProcessError::QuotaExhausted {
                    guidance: format!(
                        "The generation service is rate limiting requests and all {} attempts \
                         were rejected. Please wait a minute before trying again.",
                        attempts
                    ),
                }
            }
            GenerationError::Cancelled => ProcessError::Cancelled,
            other => {
                warn!("Generation failed: {}", other);
                ProcessError::InvocationFailed { source: other }
            }
        })?;

        match extract::extract_image(&response) {
            Some(payload) => {
                info!(
                    "Image generated: model={}, {} bytes, mime={}",
                    response.model,
                    payload.bytes.len(),
                    payload.mime_type
                );
                Ok(ProcessResult::Image(codec::encode(&payload.bytes)))
            }
            None => {
                let diagnostic = extract::collect_text(&response);
                warn!(
                    "Generation returned no image part: model={}, diagnostic={:?}",
                    response.model, diagnostic
                );
                Err(ProcessError::NoImageReturned { diagnostic })
            }
        }
    }
}
