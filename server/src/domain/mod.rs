//! # Domain Module
//!
//! Business rules for tuition billing.
//!
//! ## Module Organization
//!
//! - **money**: cents-based amounts and checked decimal tax arithmetic
//! - **plan_derivation**: pure recomputation of a plan's dependent amounts
//! - **plan_service**: authoritative create/update of payment plans
//! - **billing_service**: invoice generation, annulment and the overdue sweep
//! - **ledger_service**: abonos against an invoice, with the non-overdraw guarantee
//! - **resumen**: balance summaries and point-in-time balances for receipts
//!
//! ## Business Rules
//!
//! - `total = round(subtotal × (1 + tasa))`, rounded half-up to cents
//! - The sum of an invoice's abonos never exceeds its total
//! - An invoice whose balance reaches zero is PAGADO; removing an abono
//!   reopens it
//! - ANULADO is terminal and accepts no abonos

pub mod aggregate_lock;
pub mod billing_service;
pub mod catalog_service;
pub mod commands;
pub mod errors;
pub mod ledger_service;
pub mod models;
pub mod money;
pub mod plan_derivation;
pub mod plan_service;
pub mod resumen;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate_lock::AggregateLocks;
pub use billing_service::MatriculaPagoService;
pub use catalog_service::CatalogService;
pub use errors::{BillingError, BillingResult, ValidationError};
pub use ledger_service::PaymentLedger;
pub use plan_service::PlanPagoService;
