// Main entry point - Configuration, dependency wiring and figure rendering
use std::sync::Arc;

use anyhow::Context;
use chat_activity::application::chart_service::ChartService;
use chat_activity::application::chat_repository::ChatRepository;
use chat_activity::infrastructure::config::load_analyzer_config;
use chat_activity::infrastructure::json_repository::JsonChatRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_analyzer_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(JsonChatRepository::new(&config.data_dir));

    // Create service (application layer)
    let chart_service = ChartService::new(repository.clone(), config.chart.clone());

    let source_ids = if config.sources.is_empty() {
        repository.list_source_ids().await?
    } else {
        config.sources.clone()
    };

    let output = match source_ids.as_slice() {
        [] => anyhow::bail!("No chat sources found in {}", config.data_dir),
        [single] => chart_service.single_figure(single).await?,
        many => chart_service.combined_figure(many).await?,
    };

    let json = serde_json::to_string(&output)?;
    match &config.output_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write figure to {}", path))?;
            tracing::info!("Figure for {} source(s) written to {}", source_ids.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
