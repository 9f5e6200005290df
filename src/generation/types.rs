// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for the image generation pipeline

use thiserror::Error;

/// An uploaded image: raw bytes plus the MIME type they were identified as.
///
/// Owned by one request from upload to response; never shared or mutated.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Raw image bytes as received
    pub bytes: Vec<u8>,
    /// MIME type, sniffed from the bytes or declared by the caller
    pub mime_type: String,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// One invocation of a generation strategy: the fixed transformation
/// instruction plus the input image.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Static instruction text describing the desired transformation.
    /// Never user-supplied.
    pub prompt: String,
    /// The uploaded image to transform
    pub image: ImageAsset,
}

/// One part of a generation response, either text or inline binary data
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    /// Textual content (descriptions, refusals, diagnostics)
    Text(String),
    /// Binary content with its declared MIME type
    InlineData { mime_type: String, data: Vec<u8> },
}

/// Normalized response from a generation strategy: an ordered sequence of
/// parts as returned by the remote service.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Model that produced the response
    pub model: String,
    /// Response parts in service order
    pub parts: Vec<ResponsePart>,
}

/// A binary image payload pulled out of a generation response
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Errors from invoking the generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rate limited or out of quota; the one recoverable class
    #[error("Rate limited by generation service, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the service suggests waiting before retrying
        retry_after_secs: u64,
    },

    /// Non-recoverable API error from the generation service
    #[error("Generation API error: {status} - {message}")]
    ApiError {
        /// HTTP status code (0 if the request never got a response)
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Request to the generation service timed out
    #[error("Generation request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The service responded but the body could not be interpreted
    #[error("Invalid response from generation service: {reason}")]
    InvalidResponse {
        /// Reason the response is unusable
        reason: String,
    },

    /// Every attempt in the retry budget hit the recoverable class
    #[error("Generation quota exhausted after {attempts} attempts")]
    QuotaExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// The owning request was cancelled during a backoff wait
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether the retry loop may absorb this failure.
    ///
    /// Only the rate-limit class is recoverable; everything else propagates
    /// immediately without consuming a retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenerationError::RateLimited { .. })
    }
}

/// Terminal failure of one orchestrated request
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The remote call failed with a non-recoverable error
    #[error("Image generation failed: {source}")]
    InvocationFailed {
        #[source]
        source: GenerationError,
    },

    /// The retry budget was consumed by rate-limit responses
    #[error("{guidance}")]
    QuotaExhausted {
        /// User-facing remediation guidance
        guidance: String,
    },

    /// The remote call succeeded but returned no usable image part
    #[error("No image generated")]
    NoImageReturned {
        /// Any text the service returned instead of an image
        diagnostic: Option<String>,
    },

    /// The request was cancelled or its deadline elapsed
    #[error("Request cancelled before generation completed")]
    Cancelled,

    /// Unexpected failure in local processing
    #[error("Internal error: {0}")]
    InternalFault(String),
}

/// Successful outcome of one orchestrated request
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// Base64-encoded generated image
    Image(String),
    /// Textual diagnostic in place of an image
    Text(String),
}
