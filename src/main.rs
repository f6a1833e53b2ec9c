//! REST server entry point.

use clap::Parser;
use geocode_chat::application::orchestrator::{ChatOptions, ChatOrchestrator};
use geocode_chat::application::tooling::ToolRegistry;
use geocode_chat::config::{AppConfig, ensure_env_loaded};
use geocode_chat::infrastructure::geocode::GeocodeClient;
use geocode_chat::infrastructure::model::{ServiceAccountCredentials, TokenSource, VertexClient};
use geocode_chat::infrastructure::server::{self, ServerError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "geocode-chat", version, about = "Geocoding chat assistant REST server")]
struct Args {
    /// REST API bind address (overrides BIND_ADDR)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Environment file loaded before configuration is read
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Gemini model name (overrides CHAT_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();

    init_tracing();
    info!("Starting geocode-chat");

    ensure_env_loaded(args.env_file.as_deref());
    let mut config = AppConfig::from_env()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    let addr = args.addr.unwrap_or(config.bind_addr);
    debug!(
        project = %config.project_id,
        region = %config.region,
        model = %config.model,
        "Configuration loaded"
    );

    let credentials = ServiceAccountCredentials::from_file(&config.credentials_path)?;
    info!(client_email = %credentials.client_email, "Loaded service account credentials");
    let http = reqwest::Client::new();
    let provider = VertexClient::with_client(
        config.project_id.clone(),
        config.region.clone(),
        TokenSource::service_account(credentials, http.clone()),
        http,
    );

    let tools = ToolRegistry::geocoding(Arc::new(GeocodeClient::from_config(&config)));
    let orchestrator = Arc::new(ChatOrchestrator::new(
        Arc::new(provider),
        Arc::new(tools),
        ChatOptions::from_config(&config),
    ));

    info!(addr = %addr, "REST server starting");
    server::serve(orchestrator, addr, &config.cors_origins).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}
