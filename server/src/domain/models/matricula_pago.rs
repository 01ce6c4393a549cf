//! Domain model for a generated invoice (one installment of an enrollment).
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstadoPago {
    Pendiente,
    Pagado,
    Vencido,
    /// Terminal admin override
    Anulado,
}

impl EstadoPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPago::Pendiente => "PENDIENTE",
            EstadoPago::Pagado => "PAGADO",
            EstadoPago::Vencido => "VENCIDO",
            EstadoPago::Anulado => "ANULADO",
        }
    }
}

impl FromStr for EstadoPago {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(EstadoPago::Pendiente),
            "PAGADO" => Ok(EstadoPago::Pagado),
            "VENCIDO" => Ok(EstadoPago::Vencido),
            "ANULADO" => Ok(EstadoPago::Anulado),
            other => Err(anyhow!("unknown estado '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatriculaPago {
    pub id: i64,
    pub matricula_id: i64,
    pub plan_pago_id: i64,
    pub numero_pago: u32,
    /// Snapshot of the plan's unit subtotal at generation time
    pub subtotal: Money,
    /// Amount owed; abonos are checked against this
    pub total: Money,
    pub fecha_vencimiento: NaiveDate,
    pub estado: EstadoPago,
    /// Bumped on every ledger mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice row about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatriculaPago {
    pub matricula_id: i64,
    pub plan_pago_id: i64,
    pub numero_pago: u32,
    pub subtotal: Money,
    pub total: Money,
    pub fecha_vencimiento: NaiveDate,
}
