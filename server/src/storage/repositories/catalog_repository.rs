use anyhow::Result;
use async_trait::async_trait;
use log::info;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Impuesto, Moneda};
use crate::storage::connection::DbConnection;
use crate::storage::traits::CatalogStorage;

/// Repository for the impuestos and monedas catalogs
#[derive(Clone)]
pub struct CatalogRepository {
    db: DbConnection,
}

impl CatalogRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Fill empty catalogs with the defaults used by a fresh install
    pub async fn seed_defaults(&self) -> Result<()> {
        let impuestos: i64 = sqlx::query("SELECT COUNT(*) AS total FROM impuestos")
            .fetch_one(self.db.pool())
            .await?
            .get("total");
        if impuestos == 0 {
            self.insert_impuesto("IVA", "13").await?;
            self.insert_impuesto("Exento", "0").await?;
            info!("Seeded default impuestos");
        }

        let monedas: i64 = sqlx::query("SELECT COUNT(*) AS total FROM monedas")
            .fetch_one(self.db.pool())
            .await?
            .get("total");
        if monedas == 0 {
            self.insert_moneda("USD", "$", "Dólar estadounidense").await?;
            info!("Seeded default monedas");
        }

        Ok(())
    }

    pub async fn insert_impuesto(&self, nombre: &str, porcentaje: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO impuestos (nombre, porcentaje) VALUES (?, ?)")
            .bind(nombre)
            .bind(porcentaje)
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_moneda(&self, codigo: &str, simbolo: &str, nombre: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO monedas (codigo, simbolo, nombre) VALUES (?, ?, ?)")
            .bind(codigo)
            .bind(simbolo)
            .bind(nombre)
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    fn impuesto_from_row(row: &SqliteRow) -> Impuesto {
        Impuesto {
            id: row.get("id"),
            nombre: row.get("nombre"),
            porcentaje: row.get("porcentaje"),
        }
    }

    fn moneda_from_row(row: &SqliteRow) -> Moneda {
        Moneda {
            id: row.get("id"),
            codigo: row.get("codigo"),
            simbolo: row.get("simbolo"),
            nombre: row.get("nombre"),
        }
    }
}

#[async_trait]
impl CatalogStorage for CatalogRepository {
    async fn list_impuestos(&self) -> Result<Vec<Impuesto>> {
        let rows = sqlx::query("SELECT id, nombre, porcentaje FROM impuestos ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(Self::impuesto_from_row).collect())
    }

    async fn get_impuesto(&self, id: i64) -> Result<Option<Impuesto>> {
        let row = sqlx::query("SELECT id, nombre, porcentaje FROM impuestos WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(Self::impuesto_from_row))
    }

    async fn list_monedas(&self) -> Result<Vec<Moneda>> {
        let rows = sqlx::query("SELECT id, codigo, simbolo, nombre FROM monedas ORDER BY codigo")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(Self::moneda_from_row).collect())
    }

    async fn get_moneda(&self, id: i64) -> Result<Option<Moneda>> {
        let row = sqlx::query("SELECT id, codigo, simbolo, nombre FROM monedas WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(Self::moneda_from_row))
    }
}
