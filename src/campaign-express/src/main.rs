//! Campaign Express — organic-vs-paid campaign attribution service.
//!
//! Main entry point that loads configuration, wires the event store into the
//! attribution service, and starts the server.

use anyhow::Context;
use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_reporting::{AttributionService, InMemoryEventStore};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-express")]
#[command(about = "Organic-vs-paid campaign attribution service")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Time-decay half-life in days (overrides config)
    #[arg(long, env = "CAMPAIGN_EXPRESS__ATTRIBUTION__HALF_LIFE_DAYS")]
    half_life_days: Option<f64>,

    /// Map unknown model identifiers to LINEAR instead of rejecting them
    #[arg(
        long,
        env = "CAMPAIGN_EXPRESS__ATTRIBUTION__LENIENT_MODEL_FALLBACK",
        default_value_t = false
    )]
    lenient_models: bool,

    /// Skip the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_express=info,campaign_reporting=info,campaign_api=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Express starting up");

    // Load configuration
    let mut config = AppConfig::load().context("failed to load configuration")?;

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(half_life) = cli.half_life_days {
        config.attribution.half_life_days = half_life;
    }
    if cli.lenient_models {
        config.attribution.lenient_model_fallback = true;
    }
    config.validate()?;

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        half_life_days = config.attribution.half_life_days,
        lenient_models = config.attribution.lenient_model_fallback,
        "Configuration loaded"
    );

    let store = Arc::new(InMemoryEventStore::new());
    let attribution = Arc::new(AttributionService::new(store, &config.attribution)?);

    let api_server = ApiServer::new(config.clone(), attribution);

    if !cli.no_metrics {
        if let Err(e) = api_server.start_metrics().await {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Campaign Express is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
