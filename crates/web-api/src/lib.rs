pub mod handlers;
pub mod health;
pub mod server;
pub mod websocket;

pub use handlers::{ActivateSimulationRequest, ApiError, IngestResponse};
pub use health::{FeedHealthResponse, HealthStatus, HealthThresholds};
pub use server::{ApiServer, AppState};
