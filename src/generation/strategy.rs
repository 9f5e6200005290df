// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation strategy trait and implementations
//!
//! The two strategies realize the same contract against different upstream
//! call shapes: a two-step describe-then-generate flow and a single-call
//! image edit. One strategy is active per process, selected at startup.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::client::GeminiClient;
use super::prompts;
use super::types::{GenerationError, GenerationRequest, GenerationResponse, ResponsePart};
use crate::config::GeminiConfig;

/// Trait for implementing image generation strategies
///
/// A strategy performs one logical transformation of the input image and
/// returns the normalized multi-part response. Retrying is the caller's
/// concern; a strategy makes each upstream call exactly once.
#[async_trait]
pub trait GenerationStrategy: Send + Sync {
    /// Transform the request's image according to its instruction
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Get the strategy name for logging
    fn name(&self) -> &'static str;
}

/// Two-step strategy: describe the subject with a multimodal model, then
/// generate a styled image from the description with Imagen.
pub struct DescribeThenGenerate {
    client: Arc<GeminiClient>,
    analysis_model: String,
    image_model: String,
}

impl DescribeThenGenerate {
    pub fn new(client: Arc<GeminiClient>, config: &GeminiConfig) -> Self {
        Self {
            client,
            analysis_model: config.analysis_model.clone(),
            image_model: config.image_model.clone(),
        }
    }
}

#[async_trait]
impl GenerationStrategy for DescribeThenGenerate {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        // Step 1: describe the subject
        let analysis = self
            .client
            .generate_content(
                &self.analysis_model,
                prompts::ANALYSIS_PROMPT,
                Some(&request.image),
                false,
            )
            .await?;

        let description = analysis
            .parts
            .iter()
            .find_map(|part| match part {
                ResponsePart::Text(text) => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| GenerationError::InvalidResponse {
                reason: "analysis step returned no description".to_string(),
            })?;

        debug!(
            "Analysis complete: model={}, description_len={}",
            self.analysis_model,
            description.len()
        );

        // Step 2: generate the styled image from the description
        let prompt = prompts::generation_prompt(&description);
        let mut response = self
            .client
            .generate_images(&self.image_model, &prompt, 1, "image/jpeg")
            .await?;

        // No image produced: carry the description so the caller still gets
        // something useful back.
        if !response
            .parts
            .iter()
            .any(|p| matches!(p, ResponsePart::InlineData { .. }))
        {
            response.parts.push(ResponsePart::Text(description));
        }

        info!(
            "Generation complete: strategy={}, parts={}",
            self.name(),
            response.parts.len()
        );
        Ok(response)
    }

    fn name(&self) -> &'static str {
        "describe-then-generate"
    }
}

/// Single-call strategy: ask an image-capable model to edit the input image
/// directly, returning text and image parts in one response.
pub struct CombinedEdit {
    client: Arc<GeminiClient>,
    model: String,
}

impl CombinedEdit {
    pub fn new(client: Arc<GeminiClient>, config: &GeminiConfig) -> Self {
        Self {
            client,
            model: config.edit_model.clone(),
        }
    }
}

#[async_trait]
impl GenerationStrategy for CombinedEdit {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .client
            .generate_content(&self.model, &request.prompt, Some(&request.image), true)
            .await?;

        info!(
            "Generation complete: strategy={}, parts={}",
            self.name(),
            response.parts.len()
        );
        Ok(response)
    }

    fn name(&self) -> &'static str {
        "combined-edit"
    }
}
