// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration loaded from environment variables

use std::env;
use std::time::Duration;

use crate::generation::client::DEFAULT_BASE_URL;
use crate::generation::retry::RetryPolicy;

/// Which generation strategy the node runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Describe the subject, then generate a styled image from the description
    DescribeThenGenerate,
    /// Edit the uploaded image in a single image-capable call
    CombinedEdit,
}

impl StrategyKind {
    /// Parse a strategy name as used in `GENERATION_STRATEGY`
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "describe-then-generate" => Ok(Self::DescribeThenGenerate),
            "combined-edit" => Ok(Self::CombinedEdit),
            other => Err(format!(
                "unknown strategy '{}'; expected 'describe-then-generate' or 'combined-edit'",
                other
            )),
        }
    }
}

/// Configuration for the Google generative-image API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API credential, opaque to this node
    pub api_key: String,
    /// API base URL, overridable for tests
    pub base_url: String,
    /// Model used for the analysis step
    pub analysis_model: String,
    /// Imagen model used for the generation step
    pub image_model: String,
    /// Image-capable model used by the combined-edit strategy
    pub edit_model: String,
    /// Per-call HTTP timeout in seconds
    pub request_timeout_secs: u64,
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget, including the first attempt
    pub max_attempts: u32,
    /// Backoff delay after the first failed attempt, in seconds
    pub initial_delay_secs: u64,
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            multiplier: 2,
        }
    }
}

/// Configuration for the reimage node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Port the HTTP API listens on
    pub api_port: u16,
    /// CORS allowed origin ("*" for any)
    pub allowed_origin: String,
    /// End-to-end deadline for one request in seconds; cancels in-flight
    /// retries when it elapses
    pub request_timeout_secs: u64,
    /// Active generation strategy
    pub strategy: StrategyKind,
    /// Generation service configuration
    pub gemini: GeminiConfig,
    /// Retry policy for rate-limited generation calls
    pub retry: RetryConfig,
}

impl NodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(180),
            strategy: env::var("GENERATION_STRATEGY")
                .ok()
                .and_then(|v| StrategyKind::parse(&v).ok())
                .unwrap_or(StrategyKind::DescribeThenGenerate),
            gemini: GeminiConfig {
                api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
                base_url: env::var("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                analysis_model: env::var("ANALYSIS_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
                image_model: env::var("IMAGE_MODEL")
                    .unwrap_or_else(|_| "imagen-3.0-generate-001".to_string()),
                edit_model: env::var("EDIT_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
                request_timeout_secs: env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
            },
            retry: RetryConfig {
                max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                initial_delay_secs: env::var("RETRY_INITIAL_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.gemini.api_key.trim().is_empty() {
            return Err("GOOGLE_API_KEY must be set".to_string());
        }
        if url::Url::parse(&self.gemini.base_url).is_err() {
            return Err(format!(
                "GEMINI_API_BASE_URL '{}' is not a valid URL",
                self.gemini.base_url
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err("RETRY_MAX_ATTEMPTS must be at least 1".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
        }
        if self.gemini.request_timeout_secs == 0 {
            return Err("GEMINI_TIMEOUT_SECS must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> NodeConfig {
        NodeConfig {
            api_port: 8000,
            allowed_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 180,
            strategy: StrategyKind::DescribeThenGenerate,
            gemini: GeminiConfig {
                api_key: "test-key".to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                analysis_model: "gemini-2.5-flash".to_string(),
                image_model: "imagen-3.0-generate-001".to_string(),
                edit_model: "gemini-2.5-flash-image".to_string(),
                request_timeout_secs: 120,
            },
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_secs: 5,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut config = valid_config();
        config.gemini.api_key = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = valid_config();
        config.gemini.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            StrategyKind::parse("describe-then-generate").unwrap(),
            StrategyKind::DescribeThenGenerate
        );
        assert_eq!(
            StrategyKind::parse("combined-edit").unwrap(),
            StrategyKind::CombinedEdit
        );
        assert!(StrategyKind::parse("something-else").is_err());
    }

    #[test]
    fn test_retry_config_to_policy() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_delay_secs: 2,
        };
        let policy = config.to_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_delay, Duration::from_secs(2));
        assert_eq!(policy.multiplier, 2);
    }
}
