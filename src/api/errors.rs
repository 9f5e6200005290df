// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// API-boundary errors with machine-distinguishable kinds
#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    RateLimitExceeded {
        retry_after: u64,
        message: String,
    },
    UpstreamError(String),
    InternalError(String),
    Timeout,
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, retry_after) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::RateLimitExceeded {
                retry_after,
                message,
            } => ("rate_limit_exceeded", message.clone(), Some(*retry_after)),
            ApiError::UpstreamError(msg) => ("upstream_error", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
            ApiError::Timeout => ("timeout", "Request timed out".to_string(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            retry_after,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::RateLimitExceeded { .. } => 429,
            ApiError::UpstreamError(_) => 502,
            ApiError::InternalError(_) => 500,
            ApiError::Timeout => 504,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::RateLimitExceeded {
                retry_after,
                message,
            } => write!(
                f,
                "Rate limit exceeded, retry after {} seconds: {}",
                retry_after, message
            ),
            ApiError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for ApiError {}
