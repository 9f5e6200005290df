// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response types for the process endpoint

use serde::{Deserialize, Serialize};

use crate::generation::types::ProcessResult;

/// Successful response body for POST /v1/process
///
/// `result` holds the base64-encoded image when `type` is "image", or a
/// human-readable diagnostic when `type` is "text".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessResponse {
    pub result: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ProcessResponse {
    pub fn image(base64_payload: String) -> Self {
        Self {
            result: base64_payload,
            kind: "image".to_string(),
        }
    }

    pub fn text(message: String) -> Self {
        Self {
            result: message,
            kind: "text".to_string(),
        }
    }

    pub fn from_result(result: ProcessResult) -> Self {
        match result {
            ProcessResult::Image(payload) => Self::image(payload),
            ProcessResult::Text(message) => Self::text(message),
        }
    }
}
