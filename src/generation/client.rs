// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google generative-image API client (Gemini / Imagen)
//!
//! Wraps the two upstream call shapes the strategies need: multimodal
//! `generateContent` and Imagen `predict`. Rate-limit classification lives
//! here so nothing outside this adapter inspects upstream error text.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::codec;
use crate::config::GeminiConfig;
use crate::generation::types::{GenerationError, GenerationResponse, ImageAsset, ResponsePart};

/// Default API base URL for the Google generative language service
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Quota marker in upstream error bodies that signals the recoverable class
const QUOTA_STATUS_MARKER: &str = "RESOURCE_EXHAUSTED";

/// Retry guidance used when the service does not suggest a wait time
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for the Google generative-image API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

// --- Wire types (Google API JSON, camelCase) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    output_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<WirePrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    rai_filtered_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// --- Implementations ---

impl GeminiClient {
    /// Create a new GeminiClient from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("invalid API base URL '{}': {}", config.base_url, e))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(
            "Gemini client configured: base_url={}, timeout={}s",
            base_url, config.request_timeout_secs
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            timeout_ms: config.request_timeout_secs * 1000,
        })
    }

    /// Call `models/{model}:generateContent` with a prompt and optional image.
    ///
    /// When `want_image` is set the request asks for TEXT and IMAGE response
    /// modalities so an image-capable model can return inline binary parts.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&ImageAsset>,
        want_image: bool,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut parts = vec![WirePart {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];
        if let Some(asset) = image {
            parts.push(WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: asset.mime_type.clone(),
                    data: codec::encode(&asset.bytes),
                }),
            });
        }

        let body = GenerateContentRequest {
            contents: vec![WireContent { parts }],
            generation_config: want_image.then(|| WireGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("Gemini generateContent POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &text));
        }

        let api_response: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponse {
                    reason: format!("JSON parse error: {}", e),
                })?;

        let wire_parts = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut parts = Vec::new();
        for wire_part in wire_parts {
            if let Some(part) = part_from_wire(wire_part)? {
                parts.push(part);
            }
        }

        Ok(GenerationResponse {
            model: model.to_string(),
            parts,
        })
    }

    /// Call `models/{model}:predict` (Imagen) with a text prompt.
    ///
    /// Predictions map onto inline binary parts in service order; a filtered
    /// prediction contributes its filter reason as a text part instead.
    pub async fn generate_images(
        &self,
        model: &str,
        prompt: &str,
        sample_count: u32,
        output_mime_type: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count,
                output_mime_type: output_mime_type.to_string(),
            },
        };

        let url = format!("{}/models/{}:predict", self.base_url, model);
        debug!("Imagen predict POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &text));
        }

        let api_response: PredictResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponse {
                    reason: format!("JSON parse error: {}", e),
                })?;

        let mut parts = Vec::new();
        for prediction in api_response.predictions {
            if let Some(encoded) = prediction.bytes_base64_encoded {
                let data =
                    codec::decode(&encoded).map_err(|e| GenerationError::InvalidResponse {
                        reason: format!("invalid image encoding in prediction: {}", e),
                    })?;
                parts.push(ResponsePart::InlineData {
                    mime_type: prediction
                        .mime_type
                        .unwrap_or_else(|| output_mime_type.to_string()),
                    data,
                });
            } else if let Some(reason) = prediction.rai_filtered_reason {
                parts.push(ResponsePart::Text(reason));
            }
        }

        Ok(GenerationResponse {
            model: model.to_string(),
            parts,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GenerationError::ApiError {
                status: 0,
                message: e.to_string(),
            }
        }
    }
}

/// Classify an upstream failure into the recoverable/non-recoverable split.
///
/// HTTP 429 or an error body with status `RESOURCE_EXHAUSTED` is the
/// recoverable rate-limit class; everything else is a non-recoverable
/// [`GenerationError::ApiError`] carrying the upstream detail.
pub fn classify_failure(status: u16, body: &str) -> GenerationError {
    let parsed: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    let (message, marker) = match parsed {
        Some(envelope) => (envelope.error.message, envelope.error.status),
        None => (body.trim().to_string(), String::new()),
    };

    if status == 429 || marker == QUOTA_STATUS_MARKER {
        GenerationError::RateLimited {
            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
        }
    } else {
        GenerationError::ApiError { status, message }
    }
}

fn part_from_wire(part: WirePart) -> Result<Option<ResponsePart>, GenerationError> {
    if let Some(inline) = part.inline_data {
        let data = codec::decode(&inline.data).map_err(|e| GenerationError::InvalidResponse {
            reason: format!("invalid image encoding in response part: {}", e),
        })?;
        return Ok(Some(ResponsePart::InlineData {
            mime_type: inline.mime_type,
            data,
        }));
    }
    if let Some(text) = part.text {
        if !text.is_empty() {
            return Ok(Some(ResponsePart::Text(text)));
        }
    }
    Ok(None)
}
