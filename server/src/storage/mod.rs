//! # Storage Module
//!
//! SQLite persistence for plans, invoices, abonos and the read-only catalogs.
//!
//! Repositories expose two kinds of methods: `&self` methods that run a single
//! statement on the pool, and associated functions taking a
//! `&mut SqliteConnection` so the ledger can compose several of them inside
//! one transaction.

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::{AbonoRepository, CatalogRepository, MatriculaPagoRepository, PlanPagoRepository};
pub use traits::CatalogStorage;
