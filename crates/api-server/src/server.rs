//! API server — HTTP REST endpoints and the Prometheus metrics exporter.

use crate::attribution_rest;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_reporting::AttributionService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the REST router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Attribution
        .route(
            "/v1/attribution/events",
            post(attribution_rest::handle_record_event),
        )
        .route(
            "/v1/attribution/campaigns/:campaign_id",
            get(attribution_rest::handle_calculate),
        )
        .route(
            "/v1/attribution/campaigns/:campaign_id/report",
            get(attribution_rest::handle_report),
        )
        .route(
            "/v1/attribution/campaigns/:campaign_id/events",
            get(attribution_rest::handle_list_events),
        )
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    attribution: Arc<AttributionService>,
}

impl ApiServer {
    pub fn new(config: AppConfig, attribution: Arc<AttributionService>) -> Self {
        Self {
            config,
            attribution,
        }
    }

    /// Start the HTTP REST server. Runs until the listener fails.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState::new(self.attribution.clone(), self.config.node_id.clone());

        let app = router(state).merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
