//! Weather Report API for Thai provinces.
//!
//! Axum service that:
//! 1. Validates the requested province against a fixed list
//! 2. Searches the web for today's weather via the Serper API
//! 3. Summarizes the raw result into Thai-language HTML with an OpenAI model
//! 4. Caches each report for 30 minutes per province

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use common::{SearchProvider, Summarizer};
use openai_client::OpenAiClient;
use report::{new_report_cache, ReportPipeline};
use routes::AppState;
use serper_client::SerperClient;

/// Thai province weather report API
#[derive(Parser)]
#[command(name = "weather-api", about = "Thai province weather report API")]
struct Cli {
    /// Validate configuration and exit.
    #[arg(long)]
    check_config: bool,

    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "weather_api=info,serper_client=info,openai_client=info,report=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("🌤️  Weather Report API starting up...");

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    info!(
        "Provinces: {} configured, cache TTL: {}s, model: {}",
        cfg.provinces.len(),
        cfg.cache.ttl_secs,
        cfg.model,
    );

    if cli.check_config {
        info!("✅ Configuration OK");
        return;
    }

    // ── Shared state ─────────────────────────────────────────────────
    let search: Arc<dyn SearchProvider> = Arc::new(SerperClient::new(
        cfg.serper_api_key.clone(),
        cfg.http.request_timeout_secs,
    ));
    let summarizer: Arc<dyn Summarizer> = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.model.clone(),
        cfg.http.request_timeout_secs,
    ));
    let pipeline = Arc::new(ReportPipeline::new(
        search,
        summarizer,
        new_report_cache(),
        cfg.cache.ttl_secs,
    ));

    let state = AppState {
        pipeline,
        provinces: Arc::new(cfg.provinces.clone()),
    };
    let app = routes::router(state);

    // ── Serve ────────────────────────────────────────────────────────
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("🚀 Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Weather Report API shut down.");
}
