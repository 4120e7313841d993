//! HTTP handlers for the Gatekeeper API
//!
//! - POST /api/v1/gatekeeper/decide      - full decision for a requester's query
//! - POST /api/v1/gatekeeper/screen      - threat screen and risk score only
//! - POST /api/v1/gatekeeper/department  - department extraction only

use super::Gatekeeper;
use crate::api::ApiError;
use crate::directory::RequesterId;
use crate::screening::{RiskAssessment, ThreatVerdict};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for gatekeeper handlers
#[derive(Clone)]
pub struct GatekeeperState {
    pub gatekeeper: Arc<Gatekeeper>,
}

/// Create the gatekeeper router
pub fn gatekeeper_router(state: GatekeeperState) -> Router {
    Router::new()
        .route("/api/v1/gatekeeper/decide", post(decide))
        .route("/api/v1/gatekeeper/screen", post(screen))
        .route("/api/v1/gatekeeper/department", post(department))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Request body for a decision
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    pub requester_id: RequesterId,
    pub query: String,
}

/// Request body for text-only endpoints
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Screening response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResponse {
    pub flagged: bool,
    pub verdict: Option<ThreatVerdict>,
    pub risk: RiskAssessment,
}

/// Extraction response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    /// Canonical department or `ALL_DEPARTMENTS`
    pub department: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/gatekeeper/decide
async fn decide(
    State(state): State<GatekeeperState>,
    Json(request): Json<DecideRequest>,
) -> impl IntoResponse {
    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("query must not be empty")),
        )
            .into_response();
    }

    let record = state
        .gatekeeper
        .decide(request.requester_id, &request.query)
        .await;
    (StatusCode::OK, Json(record)).into_response()
}

/// POST /api/v1/gatekeeper/screen
async fn screen(
    State(state): State<GatekeeperState>,
    Json(request): Json<TextRequest>,
) -> impl IntoResponse {
    let verdict = state.gatekeeper.screen(&request.text);
    let risk = state.gatekeeper.assess_risk(&request.text);
    Json(ScreenResponse {
        flagged: verdict.is_some(),
        verdict,
        risk,
    })
}

/// POST /api/v1/gatekeeper/department
async fn department(
    State(state): State<GatekeeperState>,
    Json(request): Json<TextRequest>,
) -> impl IntoResponse {
    let department = state
        .gatekeeper
        .extract_department(&request.text)
        .map(|scope| scope.to_string());
    Json(DepartmentResponse { department })
}
