// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use reimage_node::{
    api,
    config::{NodeConfig, StrategyKind},
    generation::{CombinedEdit, DescribeThenGenerate, GeminiClient, GenerationStrategy},
    pipeline::ImagePipeline,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("Starting {}", reimage_node::version::get_version_string());

    let config = NodeConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let client = Arc::new(GeminiClient::new(&config.gemini)?);

    let strategy: Arc<dyn GenerationStrategy> = match config.strategy {
        StrategyKind::DescribeThenGenerate => {
            Arc::new(DescribeThenGenerate::new(client, &config.gemini))
        }
        StrategyKind::CombinedEdit => Arc::new(CombinedEdit::new(client, &config.gemini)),
    };
    tracing::info!("Generation strategy: {}", strategy.name());

    let pipeline = Arc::new(ImagePipeline::new(strategy, config.retry.to_policy()));

    api::start_server(&config, pipeline).await
}
