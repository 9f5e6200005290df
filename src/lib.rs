// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod codec;
pub mod config;
pub mod generation;
pub mod pipeline;
pub mod version;

// Re-export main types
pub use config::{GeminiConfig, NodeConfig, RetryConfig, StrategyKind};
pub use generation::{
    CombinedEdit, DescribeThenGenerate, GeminiClient, GenerationError, GenerationRequest,
    GenerationResponse, GenerationStrategy, ImageAsset, ImagePayload, ProcessError, ProcessResult,
    ResponsePart, RetryPolicy,
};
pub use pipeline::ImagePipeline;
