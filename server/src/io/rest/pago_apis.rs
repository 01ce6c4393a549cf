//! # REST API for Invoices
//!
//! Generation of matricula pagos from a plan and the admin transitions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use crate::domain::commands::pagos::GenerarPagosCommand;
use crate::io::rest::actor::Actor;
use crate::io::rest::body::ApiJson;
use crate::io::rest::mappers::{parse_fecha, PagoMapper};
use crate::AppState;
use shared::{GenerarPagosRequest, MarcarVencidosRequest, MarcarVencidosResponse, MatriculaPagoListResponse};

pub async fn generar_pagos(
    State(state): State<AppState>,
    Path(matricula_id): Path<i64>,
    ApiJson(request): ApiJson<GenerarPagosRequest>,
) -> impl IntoResponse {
    info!("POST /api/matriculas/{}/pagos - request: {:?}", matricula_id, request);

    let fecha_inicio = match parse_fecha("fechaInicio", &request.fecha_inicio) {
        Ok(fecha) => fecha,
        Err(e) => return e.into_response(),
    };
    let command = GenerarPagosCommand {
        matricula_id,
        plan_pago_id: request.plan_pago_id,
        fecha_inicio,
    };
    match state.billing_service.generar_pagos(command).await {
        Ok(pagos) => {
            let response = MatriculaPagoListResponse {
                pagos: pagos.into_iter().map(PagoMapper::to_dto).collect(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn list_pagos(State(state): State<AppState>, Path(matricula_id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/matriculas/{}/pagos", matricula_id);

    match state.billing_service.list_pagos(matricula_id).await {
        Ok(pagos) => {
            let response = MatriculaPagoListResponse {
                pagos: pagos.into_iter().map(PagoMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_pago(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/matriculas-pagos/{}", id);

    match state.billing_service.get_pago(id).await {
        Ok(pago) => (StatusCode::OK, Json(PagoMapper::to_dto(pago))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn anular_pago(
    State(state): State<AppState>,
    Actor(usuario_id): Actor,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("POST /api/matriculas-pagos/{}/anular - usuario {}", id, usuario_id);

    match state.billing_service.anular(id, usuario_id).await {
        Ok(pago) => (StatusCode::OK, Json(PagoMapper::to_dto(pago))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Overdue sweep, meant to be called by a scheduler once a day
pub async fn marcar_vencidos(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MarcarVencidosRequest>,
) -> impl IntoResponse {
    info!("POST /api/matriculas-pagos/vencidos - corte {}", request.fecha_corte);

    let fecha_corte = match parse_fecha("fechaCorte", &request.fecha_corte) {
        Ok(fecha) => fecha,
        Err(e) => return e.into_response(),
    };
    match state.billing_service.marcar_vencidos(fecha_corte).await {
        Ok(actualizados) => (StatusCode::OK, Json(MarcarVencidosResponse { actualizados })).into_response(),
        Err(e) => e.into_response(),
    }
}
