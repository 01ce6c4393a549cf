//! # Storage Traits
//!
//! Catalog lookups are the one place the domain reads data owned by another
//! part of the console, so they sit behind a trait that a different backend
//! (or a test double) can implement.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Impuesto, Moneda};

/// Read-only access to the tax and currency catalogs
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// List every tax rate ordered by id
    async fn list_impuestos(&self) -> Result<Vec<Impuesto>>;

    async fn get_impuesto(&self, id: i64) -> Result<Option<Impuesto>>;

    /// List every currency ordered by code
    async fn list_monedas(&self) -> Result<Vec<Moneda>>;

    async fn get_moneda(&self, id: i64) -> Result<Option<Moneda>>;
}
