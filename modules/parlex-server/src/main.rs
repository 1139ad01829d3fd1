use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ai_client::{ChatModel, OpenAi};
use parlex_common::Config;
use parlex_pipeline::Orchestrator;
use parlex_search::{EsSpeechIndex, SearchAggregator, SpeechIndex};

mod routes;

use routes::AppState;

#[derive(Parser)]
#[command(name = "parlex-server", about = "Parlex parliamentary research backend")]
struct Cli {
    /// Override the listen host from the environment config
    #[arg(long)]
    host: Option<String>,
    /// Override the listen port from the environment config
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting parlex-server");

    let cli = Cli::parse();
    let config = Config::from_env();

    let host = cli.host.unwrap_or_else(|| config.web_host.clone());
    let port = cli.port.unwrap_or(config.web_port);

    // Clients are built once here and injected; nothing downstream
    // constructs its own network handles.
    let model: Arc<dyn ChatModel> =
        Arc::new(OpenAi::new(&config.openai_api_key, &config.openai_model));
    let index: Arc<dyn SpeechIndex> = Arc::new(EsSpeechIndex::new(
        &config.elasticsearch_endpoint,
        &config.elasticsearch_api_key,
    ));

    let state = AppState {
        aggregator: Arc::new(SearchAggregator::new(index)),
        orchestrator: Arc::new(Orchestrator::new(model)),
    };

    let app = routes::build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
