//! Payment plan authoring.
//!
//! The server always re-derives and re-validates a plan before saving it;
//! whatever amounts the client computed are treated as input, not truth.

use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;

use crate::domain::catalog_service::CatalogService;
use crate::domain::commands::planes::SavePlanCommand;
use crate::domain::errors::{BillingError, BillingResult};
use crate::domain::models::{PlanPago, PlanState};
use crate::domain::plan_derivation::{self, EditedField};
use crate::storage::{DbConnection, MatriculaPagoRepository, PlanPagoRepository};

/// Result of running the derivation engine without saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPlan {
    pub state: PlanState,
    pub tasa_impuesto: Decimal,
}

#[derive(Clone)]
pub struct PlanPagoService {
    plan_repository: PlanPagoRepository,
    pago_repository: MatriculaPagoRepository,
    catalog_service: CatalogService,
}

impl PlanPagoService {
    pub fn new(db: DbConnection, catalog_service: CatalogService) -> Self {
        Self {
            plan_repository: PlanPagoRepository::new(db.clone()),
            pago_repository: MatriculaPagoRepository::new(db),
            catalog_service,
        }
    }

    /// Advisory derivation for the plan editor. Nothing is validated or stored.
    pub async fn derive_preview(&self, state: PlanState, edited: EditedField) -> BillingResult<DerivedPlan> {
        let tasa_impuesto = self.catalog_service.tax_rate(state.id_impuesto).await?;
        Ok(DerivedPlan {
            state: plan_derivation::derive(state, edited, tasa_impuesto)?,
            tasa_impuesto,
        })
    }

    pub async fn create_plan(&self, command: SavePlanCommand) -> BillingResult<PlanPago> {
        let state = self.authoritative_state(command).await?;
        let id = self.plan_repository.insert(&state, Utc::now()).await?;
        info!("Created plan de pago {} ({}, total {})", id, state.tipo_pago.as_str(), state.total);
        self.get_plan(id).await
    }

    /// Replace a plan. Once invoices reference it, only `nombre`,
    /// `descripcion` and `activo` may change.
    pub async fn update_plan(&self, id: i64, command: SavePlanCommand) -> BillingResult<PlanPago> {
        let existing = self.get_plan(id).await?;
        let state = self.authoritative_state(command).await?;

        let referencias = self.pago_repository.count_by_plan(id).await?;
        if referencias > 0 && !existing.state.same_terms(&state) {
            warn!(
                "Refused to change terms of plan {} referenced by {} matricula pagos",
                id, referencias
            );
            return Err(BillingError::InvalidState(format!(
                "plan de pago {} is referenced by {} generated pagos; only nombre, descripcion and activo can change",
                id, referencias
            )));
        }

        if !self.plan_repository.update(id, &state, Utc::now()).await? {
            return Err(BillingError::not_found("plan de pago", id));
        }
        info!("Updated plan de pago {}", id);
        self.get_plan(id).await
    }

    pub async fn get_plan(&self, id: i64) -> BillingResult<PlanPago> {
        self.plan_repository
            .get(id)
            .await?
            .ok_or_else(|| BillingError::not_found("plan de pago", id))
    }

    pub async fn list_planes(&self, solo_activos: bool) -> BillingResult<Vec<PlanPago>> {
        Ok(self.plan_repository.list(solo_activos).await?)
    }

    async fn authoritative_state(&self, command: SavePlanCommand) -> BillingResult<PlanState> {
        let mut state = command.state.normalized();
        state.nombre = state.nombre.trim().to_string();

        if let Some(id_moneda) = state.id_moneda {
            self.catalog_service.ensure_moneda(id_moneda).await?;
        }
        let tasa = self.catalog_service.tax_rate(state.id_impuesto).await?;

        // a state the editor already derived is kept as typed
        let edited = plan_derivation::consistent_edit(&state, tasa)
            .unwrap_or_else(|| plan_derivation::authoritative_edit(&state));
        let derived = plan_derivation::derive(state, edited, tasa)?;

        plan_derivation::validate(&derived)?;
        Ok(derived)
    }
}
