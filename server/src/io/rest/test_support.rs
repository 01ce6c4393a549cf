//! Fixtures for handler and router tests.

use axum::response::Response;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::domain::commands::pagos::GenerarPagosCommand;
use crate::domain::commands::planes::SavePlanCommand;
use crate::domain::test_support::plan_unico;
use crate::storage::{CatalogRepository, DbConnection};
use crate::AppState;

pub async fn setup_test_state() -> AppState {
    let db = DbConnection::init_in_memory().await.unwrap();
    CatalogRepository::new(db.clone()).seed_defaults().await.unwrap();
    AppState::from_connection(db)
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Active UNICO plan of 113.00
pub async fn seed_plan(state: &AppState) -> i64 {
    state
        .plan_service
        .create_plan(SavePlanCommand { state: plan_unico() })
        .await
        .unwrap()
        .id
}

/// One PENDIENTE invoice of 113.00 for matricula 1
pub async fn seed_invoice(state: &AppState) -> i64 {
    let plan_pago_id = seed_plan(state).await;
    let pagos = state
        .billing_service
        .generar_pagos(GenerarPagosCommand {
            matricula_id: 1,
            plan_pago_id,
            fecha_inicio: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        })
        .await
        .unwrap();
    pagos[0].id
}
