use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crash_signal_core::{PolicyError, RawRound, RoundEvent};
use crash_signal_pipeline::{AcceptedRound, IngestOutcome, StatsSnapshot};
use crash_signal_simulator::{SessionSummary, SimulationPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler failure mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Unavailable(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unavailable(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("no {what}")),
            Self::Unavailable(e) => {
                tracing::error!(error = %e, "pipeline request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "pipeline unavailable".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Body returned by `POST /api/rounds`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestResponse {
    Accepted(Box<AcceptedRound>),
    Duplicate,
    Rejected { reason: &'static str, message: String },
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Accepted(accepted) => Self::Accepted(accepted),
            IngestOutcome::Duplicate => Self::Duplicate,
            IngestOutcome::Rejected(e) => Self::Rejected {
                reason: e.reason_code(),
                message: e.to_string(),
            },
        }
    }
}

/// Simulation parameters; omitted fields fall back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSimulationRequest {
    pub stake: Option<Decimal>,
    #[serde(alias = "target")]
    pub target_multiplier: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared: bool,
    pub simulation: Option<SessionSummary>,
}

/// GET /api/stats
///
/// # Errors
/// Returns 503 if the pipeline actor has stopped.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, ApiError> {
    Ok(Json(state.handle.stats().await?))
}

/// GET /api/history
///
/// # Errors
/// Returns 503 if the pipeline actor has stopped.
pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoundEvent>>, ApiError> {
    Ok(Json(state.handle.history().await?))
}

/// POST /api/rounds
///
/// Always 202 once the pipeline has handled the record; the body says whether
/// it was accepted, a duplicate, or rejected.
///
/// # Errors
/// Returns 503 if the pipeline actor has stopped.
pub async fn ingest_round(
    State(state): State<AppState>,
    Json(raw): Json<RawRound>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let outcome = state.handle.ingest(raw).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome.into())))
}

/// POST /api/clear
///
/// # Errors
/// Returns 503 if the pipeline actor has stopped.
pub async fn clear_data(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let simulation = state.handle.clear_data().await?;
    Ok(Json(ClearResponse {
        cleared: true,
        simulation,
    }))
}

/// POST /api/simulation
///
/// # Errors
/// Returns 400 for an invalid policy, or 503 if the pipeline actor has stopped.
pub async fn activate_simulation(
    State(state): State<AppState>,
    body: Option<Json<ActivateSimulationRequest>>,
) -> Result<(StatusCode, Json<SessionSummary>), ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let defaults = &state.simulation_defaults;
    let policy = SimulationPolicy {
        stake: req.stake.unwrap_or(defaults.stake),
        target_multiplier: req.target_multiplier.unwrap_or(defaults.target),
        stop_loss: req.stop_loss.unwrap_or(defaults.stop_loss),
        take_profit: req.take_profit.unwrap_or(defaults.take_profit),
    };

    if let Err(e) = state.handle.activate_simulation(policy).await {
        return Err(match e.downcast::<PolicyError>() {
            Ok(policy_error) => ApiError::BadRequest(policy_error.to_string()),
            Err(other) => ApiError::Unavailable(other),
        });
    }

    let summary = state
        .handle
        .simulation_stats()
        .await?
        .ok_or(ApiError::NotFound("simulation session"))?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /api/simulation
///
/// # Errors
/// Returns 404 if no session exists, or 503 if the pipeline actor has stopped.
pub async fn deactivate_simulation(
    State(state): State<AppState>,
) -> Result<Json<SessionSummary>, ApiError> {
    state
        .handle
        .deactivate_simulation()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("simulation session"))
}

/// GET /api/simulation
///
/// # Errors
/// Returns 404 if no session exists, or 503 if the pipeline actor has stopped.
pub async fn get_simulation(
    State(state): State<AppState>,
) -> Result<Json<SessionSummary>, ApiError> {
    state
        .handle
        .simulation_stats()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("simulation session"))
}
