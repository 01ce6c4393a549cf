//! Fixtures shared by the service tests.

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use crate::domain::models::{MatriculaPago, NewMatriculaPago, PlanState, TipoPago};
use crate::domain::money::Money;
use crate::storage::{CatalogRepository, DbConnection, MatriculaPagoRepository, PlanPagoRepository};

pub async fn seeded_db() -> DbConnection {
    let db = DbConnection::init_in_memory().await.unwrap();
    CatalogRepository::new(db.clone()).seed_defaults().await.unwrap();
    db
}

/// Two independent pools over one database file, standing in for two
/// server processes. Keep the `TempDir` alive for the test's duration.
pub async fn seeded_file_dbs() -> (TempDir, DbConnection, DbConnection) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("billing.db").display());
    let first = DbConnection::new(&url).await.unwrap();
    CatalogRepository::new(first.clone()).seed_defaults().await.unwrap();
    let second = DbConnection::new(&url).await.unwrap();
    (dir, first, second)
}

/// 100.00 + 13% IVA, single payment
pub fn plan_unico() -> PlanState {
    let mut state = PlanState::new("Inscripcion", TipoPago::Unico);
    state.subtotal = Money::from_cents(10000);
    state.total = Money::from_cents(11300);
    state.id_impuesto = Some(1);
    state.id_moneda = Some(1);
    state
}

pub fn fecha(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Inserts a plan and one PENDIENTE invoice owing `total_cents`.
pub async fn invoice(db: &DbConnection, total_cents: i64) -> MatriculaPago {
    let plan_id = PlanPagoRepository::new(db.clone())
        .insert(&plan_unico(), Utc::now())
        .await
        .unwrap();

    let mut tx = db.begin().await.unwrap();
    let id = MatriculaPagoRepository::insert(
        &mut *tx,
        &NewMatriculaPago {
            matricula_id: 1,
            plan_pago_id: plan_id,
            numero_pago: 1,
            subtotal: Money::from_cents(10000),
            total: Money::from_cents(total_cents),
            fecha_vencimiento: fecha(2026, 3, 1),
        },
        Utc::now(),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    MatriculaPagoRepository::new(db.clone()).get(id).await.unwrap().unwrap()
}
