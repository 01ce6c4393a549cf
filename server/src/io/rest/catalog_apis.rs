//! # REST API for Catalogs
//!
//! Read-only impuestos and monedas.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;

use crate::io::rest::mappers::CatalogMapper;
use crate::AppState;

pub async fn list_impuestos(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/impuestos");

    match state.catalog_service.list_impuestos().await {
        Ok(impuestos) => {
            let dtos: Vec<_> = impuestos.into_iter().map(CatalogMapper::impuesto_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn list_monedas(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/monedas");

    match state.catalog_service.list_monedas().await {
        Ok(monedas) => {
            let dtos: Vec<_> = monedas.into_iter().map(CatalogMapper::moneda_to_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{body_json, setup_test_state};
    use shared::{Impuesto, Moneda};

    #[tokio::test]
    async fn test_list_catalogs() {
        let state = setup_test_state().await;

        let impuestos: Vec<Impuesto> =
            body_json(list_impuestos(State(state.clone())).await.into_response()).await;
        assert_eq!(impuestos.len(), 2);
        assert_eq!(impuestos[0].porcentaje, "13");

        let monedas: Vec<Moneda> = body_json(list_monedas(State(state)).await.into_response()).await;
        assert_eq!(monedas[0].simbolo, "$");
    }
}
