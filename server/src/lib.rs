//! # Tuition Billing Server
//!
//! Payment plans with derived totals, the invoices generated from them and
//! the abono ledger that settles those invoices.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, DTO mappers)
//!     ↓
//! Domain Layer (derivation, ledger, billing services)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::domain::{AggregateLocks, CatalogService, MatriculaPagoService, PaymentLedger, PlanPagoService};
use crate::storage::{CatalogRepository, DbConnection};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub plan_service: PlanPagoService,
    pub billing_service: MatriculaPagoService,
    pub ledger: PaymentLedger,
    pub catalog_service: CatalogService,
}

impl AppState {
    /// Wire all services over one connection. The ledger and the billing
    /// service share the same per-invoice locks.
    pub fn from_connection(db: DbConnection) -> Self {
        let locks = AggregateLocks::new();
        let catalog_service = CatalogService::new(Arc::new(CatalogRepository::new(db.clone())));

        Self {
            plan_service: PlanPagoService::new(db.clone(), catalog_service.clone()),
            billing_service: MatriculaPagoService::new(db.clone(), locks.clone()),
            ledger: PaymentLedger::new(db, locks),
            catalog_service,
        }
    }
}

/// Open the database and build the application state
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    if config.seed_catalogs {
        info!("Seeding default catalogs");
        CatalogRepository::new(db.clone()).seed_defaults().await?;
    }

    info!("Setting up application state");
    Ok(AppState::from_connection(db))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Router {
    let allow_origin = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", cors_origin);
            AllowOrigin::any()
        }
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/planes-pago", get(io::list_planes).post(io::create_plan))
        .route("/planes-pago/derivar", post(io::derivar_plan))
        .route("/planes-pago/:id", get(io::get_plan).put(io::update_plan))
        .route("/matriculas/:matricula_id/pagos", get(io::list_pagos).post(io::generar_pagos))
        .route("/matriculas-pagos/vencidos", post(io::marcar_vencidos))
        .route("/matriculas-pagos/:id", get(io::get_pago))
        .route("/matriculas-pagos/:id/anular", post(io::anular_pago))
        .route("/matriculas-pagos-abonos", post(io::create_abono))
        .route("/matriculas-pagos-abonos/resumen/:id", get(io::get_resumen))
        .route("/matriculas-pagos-abonos/:id", delete(io::delete_abono))
        .route("/matriculas-pagos-abonos/:id/recibo", get(io::get_recibo))
        .route("/impuestos", get(io::list_impuestos))
        .route("/monedas", get(io::list_monedas));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
