//! System endpoints: health check.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response with the deployment's on-chain wiring.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    legacy_program_id: String,
    sustainable_program_id: String,
    token_mint: String,
    token_decimals: u8,
}

/// `GET /health`: Liveness and configured program ids.
///
/// Answers from configuration only; the ledger is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service status, build version, timestamp, and the staking program ids and token mint this deployment targets.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = &state.staking_service;
    let programs = service.programs();
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        legacy_program_id: programs.legacy.to_string(),
        sustainable_program_id: programs.sustainable.to_string(),
        token_mint: service.token_mint().to_string(),
        token_decimals: service.token_decimals(),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
