//! Conversions between the wire DTOs in `shared` and domain types.
//!
//! Amounts cross the boundary as decimal strings and are parsed strictly:
//! more than two decimal places is an error, not a silent rounding.

pub mod abono_mapper;
pub mod catalog_mapper;
pub mod pago_mapper;
pub mod plan_mapper;

pub use abono_mapper::AbonoMapper;
pub use catalog_mapper::CatalogMapper;
pub use pago_mapper::PagoMapper;
pub use plan_mapper::PlanMapper;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::errors::ValidationError;
use crate::domain::money::Money;

pub fn parse_amount(field: &'static str, raw: &str) -> Result<Money, ValidationError> {
    raw.parse::<Money>()
        .map_err(|e| ValidationError::invalid_range(field, e.to_string()))
}

pub fn parse_optional_amount(field: &'static str, raw: Option<&str>) -> Result<Option<Money>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_amount(field, value).map(Some),
    }
}

pub fn parse_fecha(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField(field));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_range(field, format!("'{}' is not a YYYY-MM-DD date", trimmed)))
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
