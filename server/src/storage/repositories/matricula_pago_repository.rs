use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_date, format_timestamp, parse_date, parse_timestamp};
use crate::domain::models::{EstadoPago, MatriculaPago, NewMatriculaPago};
use crate::domain::money::Money;
use crate::storage::connection::DbConnection;

const PAGO_COLUMNS: &str = r#"
    id, matricula_id, plan_pago_id, numero_pago, subtotal_cents, total_cents,
    fecha_vencimiento, estado, version, created_at, updated_at
"#;

/// Repository for generated invoices.
///
/// Methods taking a `SqliteConnection` run inside a caller-owned transaction.
#[derive(Clone)]
pub struct MatriculaPagoRepository {
    db: DbConnection,
}

impl MatriculaPagoRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        pago: &NewMatriculaPago,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let timestamp = format_timestamp(&now);
        let result = sqlx::query(
            r#"
            INSERT INTO matriculas_pagos (
                matricula_id, plan_pago_id, numero_pago, subtotal_cents, total_cents,
                fecha_vencimiento, estado, version, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(pago.matricula_id)
        .bind(pago.plan_pago_id)
        .bind(i64::from(pago.numero_pago))
        .bind(pago.subtotal.cents())
        .bind(pago.total.cents())
        .bind(format_date(&pago.fecha_vencimiento))
        .bind(EstadoPago::Pendiente.as_str())
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Option<MatriculaPago>> {
        let mut conn = self.db.pool().acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<MatriculaPago>> {
        let sql = format!("SELECT {} FROM matriculas_pagos WHERE id = ?", PAGO_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    /// Claims the invoice row for the current transaction by bumping its
    /// version. SQLite takes the database write lock on this statement, so
    /// any other writer waits until the transaction ends. Returns false when
    /// the invoice does not exist.
    pub async fn claim(conn: &mut SqliteConnection, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matriculas_pagos
            SET version = version + 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(format_timestamp(&now))
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_estado(
        conn: &mut SqliteConnection,
        id: i64,
        estado: EstadoPago,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE matriculas_pagos SET estado = ?, updated_at = ? WHERE id = ?")
            .bind(estado.as_str())
            .bind(format_timestamp(&now))
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Number of invoices generated from a plan
    pub async fn count_by_plan(&self, plan_pago_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM matriculas_pagos WHERE plan_pago_id = ?")
            .bind(plan_pago_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }

    /// Invoices of an enrollment ordered by due date
    pub async fn list_by_matricula(&self, matricula_id: i64) -> Result<Vec<MatriculaPago>> {
        let sql = format!(
            "SELECT {} FROM matriculas_pagos WHERE matricula_id = ? ORDER BY fecha_vencimiento, numero_pago, id",
            PAGO_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(matricula_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    /// Invoices already generated for one enrollment and plan, by number
    pub async fn list_for_plan_in(
        conn: &mut SqliteConnection,
        matricula_id: i64,
        plan_pago_id: i64,
    ) -> Result<Vec<MatriculaPago>> {
        let sql = format!(
            "SELECT {} FROM matriculas_pagos WHERE matricula_id = ? AND plan_pago_id = ? ORDER BY numero_pago",
            PAGO_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(matricula_id)
            .bind(plan_pago_id)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    /// Moves every PENDIENTE invoice due strictly before `fecha_corte` to
    /// VENCIDO in one statement and returns the affected ids.
    pub async fn mark_overdue(
        conn: &mut SqliteConnection,
        fecha_corte: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            r#"
            UPDATE matriculas_pagos
            SET estado = ?, version = version + 1, updated_at = ?
            WHERE estado = ? AND fecha_vencimiento < ?
            RETURNING id
            "#,
        )
        .bind(EstadoPago::Vencido.as_str())
        .bind(format_timestamp(&now))
        .bind(EstadoPago::Pendiente.as_str())
        .bind(format_date(&fecha_corte))
        .fetch_all(&mut *conn)
        .await?;

        let mut ids: Vec<i64> = rows.iter().map(|r| r.get("id")).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn from_row(row: &SqliteRow) -> Result<MatriculaPago> {
        let estado: String = row.get("estado");
        let fecha: String = row.get("fecha_vencimiento");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");
        let numero_pago: i64 = row.get("numero_pago");

        Ok(MatriculaPago {
            id: row.get("id"),
            matricula_id: row.get("matricula_id"),
            plan_pago_id: row.get("plan_pago_id"),
            numero_pago: u32::try_from(numero_pago)?,
            subtotal: Money::from_cents(row.get("subtotal_cents")),
            total: Money::from_cents(row.get("total_cents")),
            fecha_vencimiento: parse_date(&fecha)?,
            estado: estado.parse()?,
            version: row.get("version"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
