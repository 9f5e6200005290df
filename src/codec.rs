// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transport encoding for image payloads
//!
//! Converts between raw image bytes and the base64 text form used on the
//! wire, and sniffs the MIME type of uploaded images from magic bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use thiserror::Error;

/// Maximum accepted upload size (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// MIME type assumed when sniffing fails and the caller declared nothing
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Custom error types for payload encoding and upload validation
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image data is empty")]
    EmptyData,
}

/// Encode raw bytes as standard base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a standard base64 string back to raw bytes
pub fn decode(encoded: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(encoded)?)
}

/// Build a data URL from an already-encoded payload
///
/// # Example
/// ```ignore
/// let url = to_data_url("aGVsbG8=", "image/jpeg");
/// assert_eq!(url, "data:image/jpeg;base64,aGVsbG8=");
/// ```
pub fn to_data_url(encoded: &str, mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, encoded)
}

/// Validate an uploaded image before it enters the pipeline
///
/// Rejects empty uploads and uploads above [`MAX_UPLOAD_SIZE`]. The bytes are
/// otherwise treated as opaque; decoding is left to the generation service.
pub fn check_upload(bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyData);
    }
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(CodecError::TooLarge(bytes.len(), MAX_UPLOAD_SIZE));
    }
    Ok(())
}

/// Determine the MIME type of uploaded image bytes
///
/// Sniffs magic bytes first and only falls back to the declared content type
/// (then [`DEFAULT_MIME_TYPE`]) when the format is not recognized, so a
/// mislabeled upload is still forwarded with the correct type.
pub fn sniff_mime_type(bytes: &[u8], declared: Option<&str>) -> String {
    match image::guess_format(bytes) {
        Ok(format) => format_to_mime(format).to_string(),
        Err(_) => declared.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
    }
}

/// Map a detected image format to its MIME type string
pub fn format_to_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}
