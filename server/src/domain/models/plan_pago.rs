//! Domain model for a payment plan.
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipoPago {
    Unico,
    Recurrente,
    Cuotas,
}

impl TipoPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPago::Unico => "UNICO",
            TipoPago::Recurrente => "RECURRENTE",
            TipoPago::Cuotas => "CUOTAS",
        }
    }
}

impl FromStr for TipoPago {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNICO" => Ok(TipoPago::Unico),
            "RECURRENTE" => Ok(TipoPago::Recurrente),
            "CUOTAS" => Ok(TipoPago::Cuotas),
            other => Err(anyhow!("unknown tipo_pago '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodicidadUnidad {
    Dias,
    Semanas,
    Meses,
    Anios,
}

impl PeriodicidadUnidad {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodicidadUnidad::Dias => "DIAS",
            PeriodicidadUnidad::Semanas => "SEMANAS",
            PeriodicidadUnidad::Meses => "MESES",
            PeriodicidadUnidad::Anios => "ANIOS",
        }
    }
}

impl FromStr for PeriodicidadUnidad {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIAS" => Ok(PeriodicidadUnidad::Dias),
            "SEMANAS" => Ok(PeriodicidadUnidad::Semanas),
            "MESES" => Ok(PeriodicidadUnidad::Meses),
            "ANIOS" => Ok(PeriodicidadUnidad::Anios),
            other => Err(anyhow!("unknown periodicidad_unidad '{}'", other)),
        }
    }
}

/// The editable values of a plan.
///
/// Which optional group is meaningful depends on `tipo_pago`: the
/// periodicidad fields for `Recurrente`, the cuota fields for `Cuotas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanState {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo_pago: TipoPago,
    pub subtotal: Money,
    pub total: Money,
    pub periodicidad_valor: Option<u32>,
    pub periodicidad_unidad: Option<PeriodicidadUnidad>,
    pub numero_cuotas: Option<u32>,
    pub subtotal_final: Option<Money>,
    pub total_final: Option<Money>,
    pub id_impuesto: Option<i64>,
    pub id_moneda: Option<i64>,
    pub activo: bool,
}

impl PlanState {
    pub fn new(nombre: impl Into<String>, tipo_pago: TipoPago) -> Self {
        Self {
            nombre: nombre.into(),
            descripcion: None,
            tipo_pago,
            subtotal: Money::zero(),
            total: Money::zero(),
            periodicidad_valor: None,
            periodicidad_unidad: None,
            numero_cuotas: None,
            subtotal_final: None,
            total_final: None,
            id_impuesto: None,
            id_moneda: None,
            activo: true,
        }
    }

    /// Clears the field group that `tipo_pago` does not use.
    pub fn normalized(mut self) -> Self {
        if self.tipo_pago != TipoPago::Cuotas {
            self.numero_cuotas = None;
            self.subtotal_final = None;
            self.total_final = None;
        }
        if self.tipo_pago != TipoPago::Recurrente {
            self.periodicidad_valor = None;
            self.periodicidad_unidad = None;
        }
        self
    }

    /// Cuota count when the plan is installment based and the count is usable
    pub fn cuotas(&self) -> Option<u32> {
        match self.tipo_pago {
            TipoPago::Cuotas => self.numero_cuotas.filter(|n| *n > 0),
            _ => None,
        }
    }

    /// True when both states bill the same amounts on the same cadence.
    pub fn same_terms(&self, other: &PlanState) -> bool {
        self.tipo_pago == other.tipo_pago
            && self.subtotal == other.subtotal
            && self.total == other.total
            && self.periodicidad_valor == other.periodicidad_valor
            && self.periodicidad_unidad == other.periodicidad_unidad
            && self.numero_cuotas == other.numero_cuotas
            && self.subtotal_final == other.subtotal_final
            && self.total_final == other.total_final
            && self.id_impuesto == other.id_impuesto
            && self.id_moneda == other.id_moneda
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPago {
    pub id: i64,
    pub state: PlanState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
