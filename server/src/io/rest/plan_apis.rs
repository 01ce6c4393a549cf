//! # REST API for Payment Plans
//!
//! CRUD for planes de pago plus the advisory derivation used by the editor.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;
use serde::Deserialize;

use crate::domain::commands::planes::SavePlanCommand;
use crate::io::rest::body::ApiJson;
use crate::io::rest::mappers::PlanMapper;
use crate::AppState;
use shared::{DerivarPlanRequest, PlanPagoRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanListQuery {
    #[serde(default)]
    pub solo_activos: bool,
}

/// List plans, optionally only the active ones
pub async fn list_planes(
    State(state): State<AppState>,
    Query(query): Query<PlanListQuery>,
) -> impl IntoResponse {
    info!("GET /api/planes-pago - query: {:?}", query);

    match state.plan_service.list_planes(query.solo_activos).await {
        Ok(planes) => {
            let dtos: Vec<_> = planes.into_iter().map(PlanMapper::to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlanPagoRequest>,
) -> impl IntoResponse {
    info!("POST /api/planes-pago - nombre: {:?}", request.nombre);

    let plan_state = match PlanMapper::to_state(request) {
        Ok(plan_state) => plan_state,
        Err(e) => return e.into_response(),
    };
    match state.plan_service.create_plan(SavePlanCommand { state: plan_state }).await {
        Ok(plan) => (StatusCode::CREATED, Json(PlanMapper::to_dto(plan))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_plan(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/planes-pago/{}", id);

    match state.plan_service.get_plan(id).await {
        Ok(plan) => (StatusCode::OK, Json(PlanMapper::to_dto(plan))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<PlanPagoRequest>,
) -> impl IntoResponse {
    info!("PUT /api/planes-pago/{}", id);

    let plan_state = match PlanMapper::to_state(request) {
        Ok(plan_state) => plan_state,
        Err(e) => return e.into_response(),
    };
    match state.plan_service.update_plan(id, SavePlanCommand { state: plan_state }).await {
        Ok(plan) => (StatusCode::OK, Json(PlanMapper::to_dto(plan))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recompute dependent amounts after an edit without saving anything
pub async fn derivar_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DerivarPlanRequest>,
) -> impl IntoResponse {
    info!("POST /api/planes-pago/derivar - campo: {:?}", request.campo_editado);

    let edited = PlanMapper::to_edited_field(request.campo_editado);
    let plan_state = match PlanMapper::to_state(request.plan) {
        Ok(plan_state) => plan_state,
        Err(e) => return e.into_response(),
    };
    match state.plan_service.derive_preview(plan_state, edited).await {
        Ok(derived) => (StatusCode::OK, Json(PlanMapper::to_calculo(derived))).into_response(),
        Err(e) => e.into_response(),
    }
}
