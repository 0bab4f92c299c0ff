use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use lifeline_core::now_ms;
use lifeline_domain::{
    Agent, AgentStatus, DispatchError, GeoPoint, IncidentCategory, IncidentStatus, Specialization,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn fail(e: DispatchError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
        DispatchError::Unauthorized(_) => StatusCode::FORBIDDEN,
        DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
        DispatchError::Conflict(_) | DispatchError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        DispatchError::Dependency(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

#[derive(Deserialize)]
pub struct CreateAlertRequest {
    pub reporter_id: String,
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: Option<f32>,
    #[serde(default)]
    pub category: Option<IncidentCategory>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAlertRequest>,
) -> ApiResult {
    let location = GeoPoint { lat: req.lat, lon: req.lon, accuracy_m: req.accuracy_m };
    let category = req.category.unwrap_or(IncidentCategory::Other);
    let description = req.description.unwrap_or_default();
    let created = state
        .lifecycle
        .create(&req.reporter_id, location, category, &description)
        .await
        .map_err(fail)?;

    let candidates: Vec<_> = created.candidates.iter().map(|c| c.summary()).collect();
    Ok(Json(json!({
        "alert": created.incident,
        "candidates": candidates,
    })))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub agent_id: String,
}

pub async fn assign_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult {
    let outcome = state
        .lifecycle
        .assign(&alert_id, &req.agent_id)
        .await
        .map_err(fail)?;

    Ok(Json(json!({
        "alert": outcome.incident,
        "agent_id": outcome.agent.id,
        "eta_minutes": outcome.eta_minutes,
    })))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub agent_id: String,
    pub status: IncidentStatus,
}

pub async fn update_alert_status(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> ApiResult {
    let incident = state
        .lifecycle
        .update_status(&alert_id, req.status, &req.agent_id)
        .await
        .map_err(fail)?;

    Ok(Json(json!({ "alert": incident })))
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub reporter_id: String,
}

pub async fn cancel_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> ApiResult {
    let incident = state
        .lifecycle
        .cancel(&alert_id, &req.reporter_id)
        .await
        .map_err(fail)?;

    Ok(Json(json!({ "alert": incident })))
}

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub category: Option<IncidentCategory>,
    pub radius_km: Option<f64>,
}

pub async fn nearby_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult {
    let location = GeoPoint::new(query.lat, query.lon);
    let ranked = state
        .lifecycle
        .nearby_agents(location, query.category, query.radius_km)
        .await
        .map_err(fail)?;

    Ok(Json(json!({ "agents": ranked })))
}

#[derive(Deserialize)]
pub struct LocationUpdateRequest {
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: Option<f32>,
}

pub async fn update_agent_location(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(req): Json<LocationUpdateRequest>,
) -> ApiResult {
    let location = GeoPoint { lat: req.lat, lon: req.lon, accuracy_m: req.accuracy_m };
    let signal = state
        .registry
        .update_location(&agent_id, location, now_ms())
        .await
        .map_err(fail)?;

    Ok(Json(json!({
        "agent_id": agent_id,
        "arrival_detected": signal.is_some(),
    })))
}

#[derive(Deserialize)]
pub struct AgentStatusRequest {
    pub status: AgentStatus,
}

pub async fn update_agent_status(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(req): Json<AgentStatusRequest>,
) -> ApiResult {
    let agent = state
        .registry
        .set_status(&agent_id, req.status)
        .await
        .map_err(fail)?;

    Ok(Json(json!({ "agent": agent })))
}

#[derive(Deserialize)]
pub struct UpsertAgentRequest {
    pub lat: f64,
    pub lon: f64,
    pub specialization: Specialization,
    pub rating: f32,
}

pub async fn upsert_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(req): Json<UpsertAgentRequest>,
) -> ApiResult {
    let location = GeoPoint::new(req.lat, req.lon);
    location
        .as_latlon()
        .validate()
        .map_err(|e| fail(DispatchError::Validation(e.to_string())))?;

    let agent = Agent {
        id: agent_id.clone(),
        location,
        location_updated_at: now_ms(),
        status: AgentStatus::Available,
        specialization: req.specialization,
        rating: req.rating,
    };
    state.registry.upsert(agent).await;
    info!(%agent_id, "agent profile upserted");

    Ok(Json(json!({ "agent_id": agent_id, "status": "registered" })))
}
