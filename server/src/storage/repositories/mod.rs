// Repository modules
pub mod abono_repository;
pub mod catalog_repository;
pub mod matricula_pago_repository;
pub mod plan_pago_repository;

pub use abono_repository::AbonoRepository;
pub use catalog_repository::CatalogRepository;
pub use matricula_pago_repository::MatriculaPagoRepository;
pub use plan_pago_repository::PlanPagoRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::money::Money;

pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid stored timestamp '{}'", raw))?
        .with_timezone(&Utc))
}

pub(crate) fn format_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid stored date '{}'", raw))
}

pub(crate) fn optional_money(cents: Option<i64>) -> Option<Money> {
    cents.map(Money::from_cents)
}

pub(crate) fn optional_count(raw: Option<i64>) -> Result<Option<u32>> {
    raw.map(|value| u32::try_from(value).with_context(|| format!("count {} out of range", value)))
        .transpose()
}
