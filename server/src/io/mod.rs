//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! ## Supported Operations
//!
//! - **/api/planes-pago**: plan CRUD and the advisory derivation
//! - **/api/matriculas/:matricula_id/pagos**: invoice generation and listing
//! - **/api/matriculas-pagos**: single invoice, annulment, overdue sweep
//! - **/api/matriculas-pagos-abonos**: abonos, balance summary, receipts
//! - **/api/impuestos**, **/api/monedas**: read-only catalogs

pub mod rest;

pub use rest::*;
