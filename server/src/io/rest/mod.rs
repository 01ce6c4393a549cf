//! # REST API Interface Layer
//!
//! HTTP endpoints for payment plans, invoices, abonos and catalogs.
//! Handlers translate DTOs from `shared` into domain commands, call one
//! service and map the outcome to a status code. No business rule lives here.
//!
//! Errors leave as `{ "error": <code>, "message": <text> }`. Write endpoints
//! that record who acted read the staff id from `X-Usuario-Id`.

pub mod abono_apis;
pub mod actor;
pub mod body;
pub mod catalog_apis;
pub mod error_response;
pub mod mappers;
pub mod pago_apis;
pub mod plan_apis;

#[cfg(test)]
pub(crate) mod test_support;

pub use abono_apis::*;
pub use catalog_apis::*;
pub use pago_apis::*;
pub use plan_apis::*;
