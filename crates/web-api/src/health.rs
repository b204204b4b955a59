//! Feed freshness endpoint.
//!
//! `/api/health` reports how long ago the newest accepted round was observed,
//! so a stalled source feed shows up without reading the logs.

use axum::{extract::State, http::StatusCode, Json};
use crash_signal_core::now_millis;
use serde::Serialize;

use crate::server::AppState;

/// Staleness limits in seconds. Rounds normally land every 10-30 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub healthy: i64,
    pub degraded: i64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            healthy: 120,
            degraded: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Classifies a staleness reading. No data at all is unhealthy.
    #[must_use]
    pub fn from_staleness(staleness_seconds: Option<i64>, thresholds: HealthThresholds) -> Self {
        match staleness_seconds {
            None => Self::Unhealthy,
            Some(s) if s <= thresholds.healthy => Self::Healthy,
            Some(s) if s <= thresholds.degraded => Self::Degraded,
            Some(_) => Self::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHealthResponse {
    pub status: HealthStatus,
    pub timestamp: i64,
    pub last_round: Option<i64>,
    pub staleness_seconds: Option<i64>,
    pub total_games: usize,
    pub rejected: u64,
    pub duplicates: u64,
}

/// GET /api/health
///
/// # Errors
/// Returns `StatusCode::SERVICE_UNAVAILABLE` if the pipeline actor has stopped.
pub async fn feed_health(
    State(state): State<AppState>,
) -> Result<Json<FeedHealthResponse>, StatusCode> {
    let stats = state.handle.stats().await.map_err(|e| {
        tracing::error!(error = %e, "pipeline unavailable for health check");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let now = now_millis();
    let last_round = stats.latest.as_ref().map(|r| r.timestamp);
    let staleness_seconds = last_round.map(|ts| (now - ts).max(0) / 1000);

    Ok(Json(FeedHealthResponse {
        status: HealthStatus::from_staleness(staleness_seconds, state.health_thresholds),
        timestamp: now,
        last_round,
        staleness_seconds,
        total_games: stats.total_games,
        rejected: stats.rejected,
        duplicates: stats.duplicates,
    }))
}
