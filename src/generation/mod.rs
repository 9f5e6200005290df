// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation module
//!
//! Everything between the orchestrator and the remote generation service:
//! - Strategy trait with two interchangeable implementations
//!   (describe-then-generate, combined-edit)
//! - Gemini/Imagen HTTP client with structured rate-limit classification
//! - Bounded exponential backoff with cooperative cancellation
//! - First-match payload extraction from multi-part responses

pub mod client;
pub mod extract;
pub mod prompts;
pub mod retry;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use client::GeminiClient;
pub use extract::{collect_text, extract_image};
pub use retry::{invoke_with_retry, RetryPolicy};
pub use strategy::{CombinedEdit, DescribeThenGenerate, GenerationStrategy};
pub use types::{
    GenerationError, GenerationRequest, GenerationResponse, ImageAsset, ImagePayload,
    ProcessError, ProcessResult, ResponsePart,
};
