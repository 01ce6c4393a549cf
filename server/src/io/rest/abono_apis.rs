//! # REST API for Abonos
//!
//! Partial payments against a matricula pago, its running balance and
//! per-abono receipts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use crate::io::rest::actor::Actor;
use crate::io::rest::body::ApiJson;
use crate::io::rest::mappers::AbonoMapper;
use crate::AppState;
use shared::CreateAbonoRequest;

/// Record an abono. The balance is checked server-side at execution time.
pub async fn create_abono(
    State(state): State<AppState>,
    Actor(usuario_id): Actor,
    ApiJson(request): ApiJson<CreateAbonoRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/matriculas-pagos-abonos - pago {} monto {} usuario {}",
        request.matricula_pago_id, request.monto, usuario_id
    );

    let command = match AbonoMapper::to_command(request, usuario_id) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };
    match state.ledger.apply_abono(command).await {
        Ok(abono) => (StatusCode::CREATED, Json(AbonoMapper::to_dto(abono))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_resumen(
    State(state): State<AppState>,
    Path(matricula_pago_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/matriculas-pagos-abonos/resumen/{}", matricula_pago_id);

    match state.ledger.get_resumen(matricula_pago_id).await {
        Ok(resumen) => (StatusCode::OK, Json(AbonoMapper::to_resumen_dto(resumen))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_abono(
    State(state): State<AppState>,
    Actor(usuario_id): Actor,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/matriculas-pagos-abonos/{} - usuario {}", id, usuario_id);

    match state.ledger.remove_abono(id, usuario_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Receipt data showing the balance as of this abono
pub async fn get_recibo(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/matriculas-pagos-abonos/{}/recibo", id);

    match state.ledger.recibo(id).await {
        Ok(recibo) => (StatusCode::OK, Json(AbonoMapper::to_recibo_dto(recibo))).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{body_json, seed_invoice, setup_test_state};
    use shared::{Abono, EstadoPago, ErrorResponse, MetodoPago, ReciboAbono, ResumenAbonos};

    fn abono(pago_id: i64, monto: &str) -> CreateAbonoRequest {
        CreateAbonoRequest {
            matricula_pago_id: pago_id,
            monto: monto.to_string(),
            metodo_pago: MetodoPago::Transferencia,
            referencia: Some("TRX-001".to_string()),
            nota: None,
        }
    }

    #[tokio::test]
    async fn test_abono_flow() {
        let state = setup_test_state().await;
        let pago_id = seed_invoice(&state).await;

        let response = create_abono(State(state.clone()), Actor(9), ApiJson(abono(pago_id, "50.00")))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let first: Abono = body_json(response).await;
        assert_eq!(first.usuario_id, 9);
        assert_eq!(first.monto, "50.00");

        let response = create_abono(State(state.clone()), Actor(9), ApiJson(abono(pago_id, "63.00")))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let resumen: ResumenAbonos =
            body_json(get_resumen(State(state.clone()), Path(pago_id)).await.into_response()).await;
        assert_eq!(resumen.total_pago, "113.00");
        assert_eq!(resumen.total_abonado, "113.00");
        assert_eq!(resumen.saldo_pendiente, "0.00");
        assert_eq!(resumen.estado, EstadoPago::Pagado);
        assert_eq!(resumen.abonos.len(), 2);

        let recibo: ReciboAbono =
            body_json(get_recibo(State(state.clone()), Path(first.id)).await.into_response()).await;
        assert_eq!(recibo.saldo_anterior, "113.00");
        assert_eq!(recibo.saldo_pendiente, "63.00");

        let response = create_abono(State(state), Actor(9), ApiJson(abono(pago_id, "0.01")))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.error, "BalanceExceeded");
    }

    #[tokio::test]
    async fn test_delete_abono_reopens() {
        let state = setup_test_state().await;
        let pago_id = seed_invoice(&state).await;
        let paid: Abono = body_json(
            create_abono(State(state.clone()), Actor(9), ApiJson(abono(pago_id, "113.00")))
                .await
                .into_response(),
        )
        .await;

        let response = delete_abono(State(state.clone()), Actor(9), Path(paid.id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);

        let resumen: ResumenAbonos =
            body_json(get_resumen(State(state.clone()), Path(pago_id)).await.into_response()).await;
        assert_eq!(resumen.estado, EstadoPago::Pendiente);
        assert_eq!(resumen.saldo_pendiente, "113.00");

        let response = delete_abono(State(state), Actor(9), Path(paid.id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_abono_rejects_bad_amounts() {
        let state = setup_test_state().await;
        let pago_id = seed_invoice(&state).await;

        for monto in ["0", "-5.00", "1.001", "abc"] {
            let response = create_abono(State(state.clone()), Actor(9), ApiJson(abono(pago_id, monto))).await;
            assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST, "monto {monto}");
        }

        let response = get_resumen(State(state), Path(pago_id + 100)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
