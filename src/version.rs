// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Reimage Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-image-transform-2025-08-25";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-08-25";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "image-transform",
    "describe-then-generate",
    "combined-edit",
    "rate-limit-backoff",
    "multipart-upload",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Reimage Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string() {
        let version = get_version_string();
        assert!(version.contains("0.1.0"));
        assert!(version.contains("2025-08-25"));
    }

    #[test]
    fn test_features() {
        assert!(FEATURES.contains(&"image-transform"));
        assert!(FEATURES.contains(&"rate-limit-backoff"));
    }
}
