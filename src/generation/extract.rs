// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Payload extraction from generation responses

use super::types::{GenerationResponse, ImagePayload, ResponsePart};

/// Find the generated image in a response.
///
/// Scans the parts in service order and returns the first inline binary
/// part. First match wins; later binary parts are ignored by contract.
/// Returns `None` when the response carries no binary part, which is a
/// normal outcome (the service may answer with text only).
pub fn extract_image(response: &GenerationResponse) -> Option<ImagePayload> {
    response.parts.iter().find_map(|part| match part {
        ResponsePart::InlineData { mime_type, data } => Some(ImagePayload {
            bytes: data.clone(),
            mime_type: mime_type.clone(),
        }),
        ResponsePart::Text(_) => None,
    })
}

/// Collect the textual parts of a response into one diagnostic string
pub fn collect_text(response: &GenerationResponse) -> Option<String> {
    let texts: Vec<&str> = response
        .parts
        .iter()
        .filter_map(|part| match part {
            ResponsePart::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(" "))
    }
}
