//! Domain model for a partial payment. Abonos are append-only: once stored
//! they are never edited, only removed through the ledger.
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetodoPago {
    Efectivo,
    Tarjeta,
    Transferencia,
    Deposito,
    Cheque,
    Otro,
}

impl MetodoPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetodoPago::Efectivo => "EFECTIVO",
            MetodoPago::Tarjeta => "TARJETA",
            MetodoPago::Transferencia => "TRANSFERENCIA",
            MetodoPago::Deposito => "DEPOSITO",
            MetodoPago::Cheque => "CHEQUE",
            MetodoPago::Otro => "OTRO",
        }
    }
}

impl FromStr for MetodoPago {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EFECTIVO" => Ok(MetodoPago::Efectivo),
            "TARJETA" => Ok(MetodoPago::Tarjeta),
            "TRANSFERENCIA" => Ok(MetodoPago::Transferencia),
            "DEPOSITO" => Ok(MetodoPago::Deposito),
            "CHEQUE" => Ok(MetodoPago::Cheque),
            "OTRO" => Ok(MetodoPago::Otro),
            other => Err(anyhow!("unknown metodo_pago '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abono {
    pub id: i64,
    pub matricula_pago_id: i64,
    pub monto: Money,
    pub metodo_pago: MetodoPago,
    pub fecha_abono: DateTime<Utc>,
    pub referencia: Option<String>,
    pub nota: Option<String>,
    pub usuario_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAbono {
    pub matricula_pago_id: i64,
    pub monto: Money,
    pub metodo_pago: MetodoPago,
    pub fecha_abono: DateTime<Utc>,
    pub referencia: Option<String>,
    pub nota: Option<String>,
    pub usuario_id: i64,
}
