use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_timestamp, parse_timestamp};
use crate::domain::models::{Abono, NewAbono};
use crate::domain::money::Money;
use crate::storage::connection::DbConnection;

const ABONO_COLUMNS: &str = r#"
    id, matricula_pago_id, monto_cents, metodo_pago, fecha_abono,
    referencia, nota, usuario_id
"#;

/// Repository for abono ledger entries. Rows are inserted or deleted, never updated.
#[derive(Clone)]
pub struct AbonoRepository {
    db: DbConnection,
}

impl AbonoRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert(conn: &mut SqliteConnection, abono: &NewAbono) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO matriculas_pagos_abonos (
                matricula_pago_id, monto_cents, metodo_pago, fecha_abono,
                referencia, nota, usuario_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(abono.matricula_pago_id)
        .bind(abono.monto.cents())
        .bind(abono.metodo_pago.as_str())
        .bind(format_timestamp(&abono.fecha_abono))
        .bind(&abono.referencia)
        .bind(&abono.nota)
        .bind(abono.usuario_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Abono>> {
        let mut conn = self.db.pool().acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<Abono>> {
        let sql = format!("SELECT {} FROM matriculas_pagos_abonos WHERE id = ?", ABONO_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    /// Returns true if a row was deleted
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM matriculas_pagos_abonos WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum of every abono recorded against an invoice
    pub async fn sum_for_pago(conn: &mut SqliteConnection, matricula_pago_id: i64) -> Result<Money> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(monto_cents), 0) AS abonado FROM matriculas_pagos_abonos WHERE matricula_pago_id = ?",
        )
        .bind(matricula_pago_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(Money::from_cents(row.get("abonado")))
    }

    /// Abonos of an invoice, oldest first
    pub async fn list_for_pago(conn: &mut SqliteConnection, matricula_pago_id: i64) -> Result<Vec<Abono>> {
        let sql = format!(
            "SELECT {} FROM matriculas_pagos_abonos WHERE matricula_pago_id = ? ORDER BY fecha_abono, id",
            ABONO_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(matricula_pago_id)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    fn from_row(row: &SqliteRow) -> Result<Abono> {
        let metodo: String = row.get("metodo_pago");
        let fecha: String = row.get("fecha_abono");

        Ok(Abono {
            id: row.get("id"),
            matricula_pago_id: row.get("matricula_pago_id"),
            monto: Money::from_cents(row.get("monto_cents")),
            metodo_pago: metodo.parse()?,
            fecha_abono: parse_timestamp(&fecha)?,
            referencia: row.get("referencia"),
            nota: row.get("nota"),
            usuario_id: row.get("usuario_id"),
        })
    }
}
