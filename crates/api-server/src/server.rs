//! API server: REST routes on the HTTP port, Prometheus metrics on their own.

use crate::rest::{self, AppState};
use axum::routing::{get, patch, post, put};
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_insights::SummaryProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Every REST route, with middleware, bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Catalog
        .route("/v1/channels", get(rest::list_channels))
        .route("/v1/customers", get(rest::list_customers))
        // Planner session
        .route("/v1/session", get(rest::get_session))
        .route("/v1/session/inputs", put(rest::replace_inputs))
        .route("/v1/session/channels/:name/toggle", post(rest::toggle_channel))
        .route(
            "/v1/session/channels/:name/settings",
            patch(rest::update_channel_settings),
        )
        .route("/v1/session/presets/:preset", post(rest::apply_preset))
        .route("/v1/session/customer", post(rest::select_customer))
        .route("/v1/session/run", post(rest::start_run))
        .route("/v1/session/reset", post(rest::reset_session))
        .route("/v1/session/results", get(rest::get_results))
        .route(
            "/v1/session/visibility/:series/:key/toggle",
            post(rest::toggle_series),
        )
        .route("/v1/session/export", get(rest::export_workbook))
        // One-shot planning
        .route("/v1/plans", post(rest::plan))
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

pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, summaries: Arc<dyn SummaryProvider>) -> Self {
        let state = AppState::new(&config, summaries);
        Self { config, state }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(
            addr = %addr,
            summaries = self.state.summaries.name(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        // Spawns the scrape listener onto the current runtime.
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
