use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// DbConnection owns the pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and make sure the
    /// schema exists.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let options = SqliteConnectOptions::from_str(url)?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Private in-memory database. A single connection that never expires,
    /// since an in-memory SQLite database lives only as long as its connection.
    pub async fn init_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a write transaction
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS impuestos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                porcentaje TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS monedas (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                codigo TEXT NOT NULL UNIQUE,
                simbolo TEXT NOT NULL,
                nombre TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS planes_pago (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                descripcion TEXT,
                tipo_pago TEXT NOT NULL,
                subtotal_cents INTEGER NOT NULL,
                total_cents INTEGER NOT NULL,
                periodicidad_valor INTEGER,
                periodicidad_unidad TEXT,
                numero_cuotas INTEGER,
                subtotal_final_cents INTEGER,
                total_final_cents INTEGER,
                id_impuesto INTEGER NOT NULL REFERENCES impuestos (id),
                id_moneda INTEGER NOT NULL REFERENCES monedas (id),
                activo BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matriculas_pagos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                matricula_id INTEGER NOT NULL,
                plan_pago_id INTEGER NOT NULL REFERENCES planes_pago (id),
                numero_pago INTEGER NOT NULL,
                subtotal_cents INTEGER NOT NULL,
                total_cents INTEGER NOT NULL,
                fecha_vencimiento TEXT NOT NULL,
                estado TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (matricula_id, plan_pago_id, numero_pago)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_matriculas_pagos_matricula
            ON matriculas_pagos(matricula_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_matriculas_pagos_vencimiento
            ON matriculas_pagos(estado, fecha_vencimiento);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matriculas_pagos_abonos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                matricula_pago_id INTEGER NOT NULL REFERENCES matriculas_pagos (id),
                monto_cents INTEGER NOT NULL CHECK (monto_cents > 0),
                metodo_pago TEXT NOT NULL,
                fecha_abono TEXT NOT NULL,
                referencia TEXT,
                nota TEXT,
                usuario_id INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_abonos_pago_fecha
            ON matriculas_pagos_abonos(matricula_pago_id, fecha_abono);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
