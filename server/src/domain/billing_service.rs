//! Invoice generation and the estado transitions the ledger does not drive:
//! annulment by an administrator and the overdue sweep.

use chrono::{Days, Months, NaiveDate, Utc};
use log::info;

use crate::domain::aggregate_lock::AggregateLocks;
use crate::domain::commands::pagos::GenerarPagosCommand;
use crate::domain::errors::{BillingError, BillingResult, ValidationError};
use crate::domain::models::{
    EstadoPago, MatriculaPago, NewMatriculaPago, PeriodicidadUnidad, PlanPago, TipoPago,
};
use crate::domain::plan_derivation;
use crate::storage::{DbConnection, MatriculaPagoRepository, PlanPagoRepository};

#[derive(Clone)]
pub struct MatriculaPagoService {
    db: DbConnection,
    pago_repository: MatriculaPagoRepository,
    locks: AggregateLocks,
}

/// `fecha` moved forward by `count` periods of `unidad`.
pub fn add_periods(fecha: NaiveDate, unidad: PeriodicidadUnidad, count: u32) -> Option<NaiveDate> {
    match unidad {
        PeriodicidadUnidad::Dias => fecha.checked_add_days(Days::new(u64::from(count))),
        PeriodicidadUnidad::Semanas => fecha.checked_add_days(Days::new(u64::from(count) * 7)),
        PeriodicidadUnidad::Meses => fecha.checked_add_months(Months::new(count)),
        PeriodicidadUnidad::Anios => fecha.checked_add_months(Months::new(count.checked_mul(12)?)),
    }
}

/// Invoices to create for `plan`, given the ones already generated for the
/// same enrollment.
///
/// UNICO and CUOTAS plans are generated once, in full. RECURRENTE plans grow
/// by one period per call; due dates are counted from the first invoice so
/// month-end dates do not drift.
pub fn schedule(
    plan: &PlanPago,
    matricula_id: i64,
    fecha_inicio: NaiveDate,
    existentes: &[MatriculaPago],
) -> BillingResult<Vec<NewMatriculaPago>> {
    let state = &plan.state;
    let nuevo = |numero_pago: u32, fecha_vencimiento: NaiveDate| NewMatriculaPago {
        matricula_id,
        plan_pago_id: plan.id,
        numero_pago,
        subtotal: state.subtotal,
        total: state.total,
        fecha_vencimiento,
    };
    let out_of_range = || ValidationError::invalid_range("fechaInicio", "schedule runs past the supported calendar");

    match state.tipo_pago {
        TipoPago::Unico | TipoPago::Cuotas if !existentes.is_empty() => Err(BillingError::InvalidState(format!(
            "matricula {} already has pagos for plan de pago {}",
            matricula_id, plan.id
        ))),
        TipoPago::Unico => Ok(vec![nuevo(1, fecha_inicio)]),
        TipoPago::Cuotas => {
            let cuotas = state
                .cuotas()
                .ok_or(ValidationError::RequiredField("numeroCuotas"))?;
            (0..cuotas)
                .map(|i| {
                    fecha_inicio
                        .checked_add_months(Months::new(i))
                        .map(|fecha| nuevo(i + 1, fecha))
                        .ok_or_else(|| BillingError::from(out_of_range()))
                })
                .collect()
        }
        TipoPago::Recurrente => {
            let valor = state
                .periodicidad_valor
                .filter(|v| *v > 0)
                .ok_or(ValidationError::RequiredField("periodicidadValor"))?;
            let unidad = state
                .periodicidad_unidad
                .ok_or(ValidationError::RequiredField("periodicidadUnidad"))?;

            let (ancla, numero) = match (existentes.first(), existentes.iter().map(|p| p.numero_pago).max()) {
                (Some(primero), Some(ultimo)) => (primero.fecha_vencimiento, ultimo + 1),
                _ => (fecha_inicio, 1),
            };
            let fecha = (numero - 1)
                .checked_mul(valor)
                .and_then(|periodos| add_periods(ancla, unidad, periodos))
                .ok_or_else(out_of_range)?;
            Ok(vec![nuevo(numero, fecha)])
        }
    }
}

impl MatriculaPagoService {
    pub fn new(db: DbConnection, locks: AggregateLocks) -> Self {
        Self {
            pago_repository: MatriculaPagoRepository::new(db.clone()),
            db,
            locks,
        }
    }

    /// Generate the next invoices of an enrollment from a plan. Returns only
    /// the invoices created by this call.
    ///
    /// Runs in one transaction whose first statement locks the plan row, so
    /// concurrent generations for the same plan see each other's invoices.
    pub async fn generar_pagos(&self, command: GenerarPagosCommand) -> BillingResult<Vec<MatriculaPago>> {
        let plan_id = command.plan_pago_id;
        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        if !PlanPagoRepository::lock_in(&mut tx, plan_id).await? {
            return Err(BillingError::not_found("plan de pago", plan_id));
        }
        let plan = PlanPagoRepository::get_in(&mut tx, plan_id)
            .await?
            .ok_or_else(|| BillingError::not_found("plan de pago", plan_id))?;
        if !plan.state.activo {
            return Err(BillingError::InvalidState(format!(
                "plan de pago {} is inactive",
                plan.id
            )));
        }
        plan_derivation::validate(&plan.state)?;

        let existentes =
            MatriculaPagoRepository::list_for_plan_in(&mut tx, command.matricula_id, plan.id).await?;
        let nuevos = schedule(&plan, command.matricula_id, command.fecha_inicio, &existentes)?;

        let mut ids = Vec::with_capacity(nuevos.len());
        for nuevo in &nuevos {
            ids.push(MatriculaPagoRepository::insert(&mut tx, nuevo, now).await?);
        }
        let mut creados = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(pago) = MatriculaPagoRepository::get_in(&mut tx, id).await? {
                creados.push(pago);
            }
        }
        tx.commit().await?;

        info!(
            "Generated {} pagos for matricula {} from plan de pago {}",
            creados.len(),
            command.matricula_id,
            plan.id
        );
        Ok(creados)
    }

    pub async fn get_pago(&self, id: i64) -> BillingResult<MatriculaPago> {
        self.pago_repository
            .get(id)
            .await?
            .ok_or_else(|| BillingError::not_found("matricula pago", id))
    }

    pub async fn list_pagos(&self, matricula_id: i64) -> BillingResult<Vec<MatriculaPago>> {
        Ok(self.pago_repository.list_by_matricula(matricula_id).await?)
    }

    /// Terminal admin override. Serialized with the ledger on the same invoice.
    pub async fn anular(&self, id: i64, usuario_id: i64) -> BillingResult<MatriculaPago> {
        let _guard = self.locks.acquire(id).await;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        if !MatriculaPagoRepository::claim(&mut tx, id, now).await? {
            return Err(BillingError::not_found("matricula pago", id));
        }
        let pago = MatriculaPagoRepository::get_in(&mut tx, id)
            .await?
            .ok_or_else(|| BillingError::not_found("matricula pago", id))?;
        if pago.estado == EstadoPago::Anulado {
            return Err(BillingError::InvalidState(format!("matricula pago {} is already anulado", id)));
        }
        MatriculaPagoRepository::update_estado(&mut tx, id, EstadoPago::Anulado, now).await?;
        tx.commit().await?;

        info!(
            "Matricula pago {} anulado by usuario {} (was {})",
            id,
            usuario_id,
            pago.estado.as_str()
        );
        self.get_pago(id).await
    }

    /// Mark every PENDIENTE invoice due before `fecha_corte` as VENCIDO.
    pub async fn marcar_vencidos(&self, fecha_corte: NaiveDate) -> BillingResult<Vec<i64>> {
        let mut conn = self.db.pool().acquire().await.map_err(BillingError::from)?;
        let ids = MatriculaPagoRepository::mark_overdue(&mut conn, fecha_corte, Utc::now()).await?;
        if !ids.is_empty() {
            info!("Marked {} matricula pagos as vencido before {}", ids.len(), fecha_corte);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger_service::PaymentLedger;
    use crate::domain::commands::abonos::ApplyAbonoCommand;
    use crate::domain::models::{MetodoPago, PlanState};
    use crate::domain::money::Money;
    use crate::domain::test_support::{fecha, plan_unico, seeded_db, seeded_file_dbs};

    async fn setup() -> (MatriculaPagoService, DbConnection) {
        let db = seeded_db().await;
        (MatriculaPagoService::new(db.clone(), AggregateLocks::new()), db)
    }

    async fn store_plan(db: &DbConnection, state: &PlanState) -> i64 {
        PlanPagoRepository::new(db.clone()).insert(state, Utc::now()).await.unwrap()
    }

    fn generar(plan_pago_id: i64, fecha_inicio: NaiveDate) -> GenerarPagosCommand {
        GenerarPagosCommand {
            matricula_id: 10,
            plan_pago_id,
            fecha_inicio,
        }
    }

    #[test]
    fn test_add_periods() {
        let start = fecha(2026, 1, 31);
        assert_eq!(add_periods(start, PeriodicidadUnidad::Dias, 1), Some(fecha(2026, 2, 1)));
        assert_eq!(add_periods(start, PeriodicidadUnidad::Semanas, 2), Some(fecha(2026, 2, 14)));
        assert_eq!(add_periods(start, PeriodicidadUnidad::Meses, 1), Some(fecha(2026, 2, 28)));
        assert_eq!(add_periods(start, PeriodicidadUnidad::Anios, 1), Some(fecha(2027, 1, 31)));
    }

    #[tokio::test]
    async fn test_generate_unico_once() {
        let (service, db) = setup().await;
        let plan_id = store_plan(&db, &plan_unico()).await;

        let pagos = service.generar_pagos(generar(plan_id, fecha(2026, 2, 1))).await.unwrap();
        assert_eq!(pagos.len(), 1);
        assert_eq!(pagos[0].total, Money::from_cents(11300));
        assert_eq!(pagos[0].estado, EstadoPago::Pendiente);
        assert_eq!(pagos[0].fecha_vencimiento, fecha(2026, 2, 1));

        let again = service.generar_pagos(generar(plan_id, fecha(2026, 2, 1))).await;
        assert!(matches!(again, Err(BillingError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_generate_cuotas_monthly() {
        let (service, db) = setup().await;
        let mut state = plan_unico();
        state.tipo_pago = TipoPago::Cuotas;
        state.numero_cuotas = Some(3);
        state.subtotal_final = Some(Money::from_cents(30000));
        state.total_final = Some(Money::from_cents(33900));
        let plan_id = store_plan(&db, &state).await;

        let pagos = service.generar_pagos(generar(plan_id, fecha(2026, 1, 31))).await.unwrap();
        let fechas: Vec<NaiveDate> = pagos.iter().map(|p| p.fecha_vencimiento).collect();
        assert_eq!(fechas, vec![fecha(2026, 1, 31), fecha(2026, 2, 28), fecha(2026, 3, 31)]);
        let total: Money = pagos.iter().map(|p| p.total).sum();
        assert_eq!(total, Money::from_cents(33900));
        assert_eq!(service.list_pagos(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_recurrente_appends_next_period() {
        let (service, db) = setup().await;
        let mut state = plan_unico();
        state.tipo_pago = TipoPago::Recurrente;
        state.periodicidad_valor = Some(1);
        state.periodicidad_unidad = Some(PeriodicidadUnidad::Meses);
        let plan_id = store_plan(&db, &state).await;

        for _ in 0..3 {
            service.generar_pagos(generar(plan_id, fecha(2026, 1, 31))).await.unwrap();
        }
        let pagos = service.list_pagos(10).await.unwrap();
        let numeros: Vec<u32> = pagos.iter().map(|p| p.numero_pago).collect();
        let fechas: Vec<NaiveDate> = pagos.iter().map(|p| p.fecha_vencimiento).collect();
        assert_eq!(numeros, vec![1, 2, 3]);
        assert_eq!(fechas, vec![fecha(2026, 1, 31), fecha(2026, 2, 28), fecha(2026, 3, 31)]);
    }

    #[tokio::test]
    async fn test_generate_rejects_inactive_or_missing_plan() {
        let (service, db) = setup().await;
        let mut inactive = plan_unico();
        inactive.activo = false;
        let plan_id = store_plan(&db, &inactive).await;

        assert!(matches!(
            service.generar_pagos(generar(plan_id, fecha(2026, 1, 1))).await,
            Err(BillingError::InvalidState(_))
        ));
        assert!(matches!(
            service.generar_pagos(generar(404, fecha(2026, 1, 1))).await,
            Err(BillingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_anular_is_terminal() {
        let (service, db) = setup().await;
        let plan_id = store_plan(&db, &plan_unico()).await;
        let pago = service.generar_pagos(generar(plan_id, fecha(2026, 2, 1))).await.unwrap()[0].clone();

        let anulado = service.anular(pago.id, 3).await.unwrap();
        assert_eq!(anulado.estado, EstadoPago::Anulado);
        assert!(matches!(service.anular(pago.id, 3).await, Err(BillingError::InvalidState(_))));
        assert!(matches!(service.anular(999, 3).await, Err(BillingError::NotFound { .. })));

        let ledger = PaymentLedger::new(db.clone(), AggregateLocks::new());
        let result = ledger
            .apply_abono(ApplyAbonoCommand {
                matricula_pago_id: pago.id,
                monto: Money::from_cents(100),
                metodo_pago: MetodoPago::Tarjeta,
                referencia: None,
                nota: None,
                usuario_id: 3,
            })
            .await;
        assert!(matches!(result, Err(BillingError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_marcar_vencidos_only_touches_pendientes() {
        let (service, db) = setup().await;
        let mut state = plan_unico();
        state.tipo_pago = TipoPago::Cuotas;
        state.numero_cuotas = Some(3);
        let plan_id = store_plan(&db, &state).await;
        let pagos = service.generar_pagos(generar(plan_id, fecha(2026, 1, 15))).await.unwrap();
        service.anular(pagos[0].id, 1).await.unwrap();

        let vencidos = service.marcar_vencidos(fecha(2026, 3, 1)).await.unwrap();
        assert_eq!(vencidos, vec![pagos[1].id]);

        assert_eq!(service.get_pago(pagos[0].id).await.unwrap().estado, EstadoPago::Anulado);
        assert_eq!(service.get_pago(pagos[1].id).await.unwrap().estado, EstadoPago::Vencido);
        assert_eq!(service.get_pago(pagos[2].id).await.unwrap().estado, EstadoPago::Pendiente);
        assert!(service.marcar_vencidos(fecha(2026, 3, 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_generation_yields_one_schedule() {
        let (_dir, db_a, db_b) = seeded_file_dbs().await;
        let plan_id = store_plan(&db_a, &plan_unico()).await;
        let service_a = MatriculaPagoService::new(db_a.clone(), AggregateLocks::new());
        let service_b = MatriculaPagoService::new(db_b, AggregateLocks::new());

        let (a, b) = tokio::join!(
            service_a.generar_pagos(generar(plan_id, fecha(2026, 2, 1))),
            service_b.generar_pagos(generar(plan_id, fecha(2026, 2, 1)))
        );

        let generated = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(generated, 1, "results: {:?} {:?}", a, b);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(BillingError::InvalidState(_))));
        assert_eq!(service_a.list_pagos(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_missing_plan() {
        let (service, _db) = setup().await;
        let result = service.generar_pagos(generar(404, fecha(2026, 2, 1))).await;
        assert!(matches!(result, Err(BillingError::NotFound { entity: "plan de pago", .. })));
    }
}
