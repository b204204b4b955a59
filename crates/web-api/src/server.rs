use axum::{
    routing::{get, post},
    Router,
};
use crash_signal_core::{ServerConfig, SimulationDefaults};
use crash_signal_pipeline::PipelineHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::health::{self, HealthThresholds};
use crate::{handlers, websocket};

/// Shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub handle: PipelineHandle,
    pub simulation_defaults: SimulationDefaults,
    pub health_thresholds: HealthThresholds,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub fn new(handle: PipelineHandle, simulation_defaults: SimulationDefaults) -> Self {
        Self {
            state: AppState {
                handle,
                simulation_defaults,
                health_thresholds: HealthThresholds::default(),
            },
        }
    }

    #[must_use]
    pub const fn with_health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.state.health_thresholds = thresholds;
        self
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/stats", get(handlers::get_stats))
            .route("/api/history", get(handlers::get_history))
            .route("/api/rounds", post(handlers::ingest_round))
            .route("/api/clear", post(handlers::clear_data))
            .route(
                "/api/simulation",
                get(handlers::get_simulation)
                    .post(handlers::activate_simulation)
                    .delete(handlers::deactivate_simulation),
            )
            .route("/api/health", get(health::feed_health))
            .route("/ws", get(websocket::websocket_handler))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server on the configured host and port.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, config: &ServerConfig) -> anyhow::Result<()> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
