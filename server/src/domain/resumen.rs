//! Read-only projections over an invoice's abonos.
//!
//! Everything here works on a snapshot that the caller already loaded, so
//! none of it needs a lock.

use std::cmp::Ordering;

use crate::domain::models::{Abono, EstadoPago, MatriculaPago};
use crate::domain::money::Money;

/// Balance summary for one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumenAbonos {
    pub matricula_pago_id: i64,
    pub estado: EstadoPago,
    pub total_pago: Money,
    pub total_abonado: Money,
    pub saldo_pendiente: Money,
    /// Oldest first
    pub abonos: Vec<Abono>,
}

/// Balance as it stood right after one abono, for reprinting its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReciboAbono {
    pub abono: Abono,
    pub total_pago: Money,
    pub saldo_anterior: Money,
    pub saldo_pendiente: Money,
}

/// Orders abonos chronologically. Ties on `fecha_abono` fall back to
/// insertion order (`id`).
pub fn sort_chronologically(abonos: &mut [Abono]) {
    abonos.sort_by(chronological);
}

fn chronological(a: &Abono, b: &Abono) -> Ordering {
    a.fecha_abono.cmp(&b.fecha_abono).then(a.id.cmp(&b.id))
}

impl ResumenAbonos {
    pub fn project(pago: &MatriculaPago, mut abonos: Vec<Abono>) -> Self {
        sort_chronologically(&mut abonos);
        let total_abonado: Money = abonos.iter().map(|a| a.monto).sum();
        Self {
            matricula_pago_id: pago.id,
            estado: pago.estado,
            total_pago: pago.total,
            total_abonado,
            saldo_pendiente: pago.total - total_abonado,
            abonos,
        }
    }

    /// See [`historical_balance`].
    pub fn balance_after(&self, abono_id: i64) -> Option<Money> {
        historical_balance(self.total_pago, &self.abonos, abono_id)
    }

    /// Receipt view for one of this invoice's abonos.
    pub fn recibo(&self, abono_id: i64) -> Option<ReciboAbono> {
        let abono = self.abonos.iter().find(|a| a.id == abono_id)?.clone();
        let saldo_pendiente = self.balance_after(abono_id)?;
        Some(ReciboAbono {
            saldo_anterior: saldo_pendiente + abono.monto,
            total_pago: self.total_pago,
            saldo_pendiente,
            abono,
        })
    }
}

/// Replays `abonos` in chronological order and returns `total_pago` minus
/// everything paid up to and including `abono_id`. `None` when the abono is
/// not part of the ledger.
pub fn historical_balance(total_pago: Money, abonos: &[Abono], abono_id: i64) -> Option<Money> {
    let mut ordered: Vec<&Abono> = abonos.iter().collect();
    ordered.sort_by(|a, b| chronological(a, b));

    let mut running = Money::zero();
    for abono in ordered {
        running += abono.monto;
        if abono.id == abono_id {
            return Some(total_pago - running);
        }
    }
    None
}
