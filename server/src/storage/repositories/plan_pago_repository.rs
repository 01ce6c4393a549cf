use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_timestamp, optional_count, optional_money, parse_timestamp};
use crate::domain::models::{PlanPago, PlanState};
use crate::domain::money::Money;
use crate::storage::connection::DbConnection;

const PLAN_COLUMNS: &str = r#"
    id, nombre, descripcion, tipo_pago, subtotal_cents, total_cents,
    periodicidad_valor, periodicidad_unidad, numero_cuotas,
    subtotal_final_cents, total_final_cents, id_impuesto, id_moneda,
    activo, created_at, updated_at
"#;

/// Repository for payment plans
#[derive(Clone)]
pub struct PlanPagoRepository {
    db: DbConnection,
}

impl PlanPagoRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a new plan and return its id
    pub async fn insert(&self, state: &PlanState, now: DateTime<Utc>) -> Result<i64> {
        let timestamp = format_timestamp(&now);
        let result = sqlx::query(
            r#"
            INSERT INTO planes_pago (
                nombre, descripcion, tipo_pago, subtotal_cents, total_cents,
                periodicidad_valor, periodicidad_unidad, numero_cuotas,
                subtotal_final_cents, total_final_cents, id_impuesto, id_moneda,
                activo, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&state.nombre)
        .bind(&state.descripcion)
        .bind(state.tipo_pago.as_str())
        .bind(state.subtotal.cents())
        .bind(state.total.cents())
        .bind(state.periodicidad_valor.map(i64::from))
        .bind(state.periodicidad_unidad.map(|u| u.as_str()))
        .bind(state.numero_cuotas.map(i64::from))
        .bind(state.subtotal_final.map(|m| m.cents()))
        .bind(state.total_final.map(|m| m.cents()))
        .bind(state.id_impuesto)
        .bind(state.id_moneda)
        .bind(state.activo)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite a plan. Returns false when the id does not exist.
    pub async fn update(&self, id: i64, state: &PlanState, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE planes_pago SET
                nombre = ?, descripcion = ?, tipo_pago = ?, subtotal_cents = ?, total_cents = ?,
                periodicidad_valor = ?, periodicidad_unidad = ?, numero_cuotas = ?,
                subtotal_final_cents = ?, total_final_cents = ?, id_impuesto = ?, id_moneda = ?,
                activo = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&state.nombre)
        .bind(&state.descripcion)
        .bind(state.tipo_pago.as_str())
        .bind(state.subtotal.cents())
        .bind(state.total.cents())
        .bind(state.periodicidad_valor.map(i64::from))
        .bind(state.periodicidad_unidad.map(|u| u.as_str()))
        .bind(state.numero_cuotas.map(i64::from))
        .bind(state.subtotal_final.map(|m| m.cents()))
        .bind(state.total_final.map(|m| m.cents()))
        .bind(state.id_impuesto)
        .bind(state.id_moneda)
        .bind(state.activo)
        .bind(format_timestamp(&now))
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, id: i64) -> Result<Option<PlanPago>> {
        let mut conn = self.db.pool().acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<PlanPago>> {
        let sql = format!("SELECT {} FROM planes_pago WHERE id = ?", PLAN_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    /// Takes the database write lock for the current transaction through a
    /// write to the plan row that changes nothing. Invoice generation from
    /// one plan is serialized this way. Returns false when the plan does not
    /// exist.
    pub async fn lock_in(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE planes_pago SET id = id WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List plans ordered by name, optionally only active ones
    pub async fn list(&self, solo_activos: bool) -> Result<Vec<PlanPago>> {
        let sql = format!(
            "SELECT {} FROM planes_pago WHERE (? = 0 OR activo = 1) ORDER BY nombre, id",
            PLAN_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(solo_activos)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    fn from_row(row: &SqliteRow) -> Result<PlanPago> {
        let unidad: Option<String> = row.get("periodicidad_unidad");
        let tipo_pago: String = row.get("tipo_pago");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(PlanPago {
            id: row.get("id"),
            state: PlanState {
                nombre: row.get("nombre"),
                descripcion: row.get("descripcion"),
                tipo_pago: tipo_pago.parse()?,
                subtotal: Money::from_cents(row.get("subtotal_cents")),
                total: Money::from_cents(row.get("total_cents")),
                periodicidad_valor: optional_count(row.get("periodicidad_valor"))?,
                periodicidad_unidad: unidad.as_deref().map(str::parse).transpose()?,
                numero_cuotas: optional_count(row.get("numero_cuotas"))?,
                subtotal_final: optional_money(row.get("subtotal_final_cents")),
                total_final: optional_money(row.get("total_final_cents")),
                id_impuesto: row.get("id_impuesto"),
                id_moneda: row.get("id_moneda"),
                activo: row.get("activo"),
            },
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
