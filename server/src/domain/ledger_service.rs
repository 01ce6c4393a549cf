//! The abono ledger for generated invoices.
//!
//! Every mutation runs under the invoice's in-process lock and inside one
//! SQLite transaction whose first statement writes the invoice row. The
//! balance is then re-read from the persisted abonos, never taken from the
//! caller, so two payments racing for the same saldo cannot both pass.

use chrono::Utc;
use log::{info, warn};

use crate::domain::aggregate_lock::AggregateLocks;
use crate::domain::commands::abonos::ApplyAbonoCommand;
use crate::domain::errors::{BillingError, BillingResult, ValidationError};
use crate::domain::models::{Abono, EstadoPago, MatriculaPago, NewAbono};
use crate::domain::money::Money;
use crate::domain::resumen::{ReciboAbono, ResumenAbonos};
use crate::storage::{AbonoRepository, DbConnection, MatriculaPagoRepository};

#[derive(Clone)]
pub struct PaymentLedger {
    db: DbConnection,
    abono_repository: AbonoRepository,
    locks: AggregateLocks,
}

/// Checks an abono against the balance as it stands now and returns the
/// estado the invoice should have afterwards.
pub fn evaluate_abono(pago: &MatriculaPago, abonado: Money, monto: Money) -> BillingResult<EstadoPago> {
    if pago.estado == EstadoPago::Anulado {
        return Err(BillingError::InvalidState(format!(
            "matricula pago {} is anulado and accepts no abonos",
            pago.id
        )));
    }
    let saldo = pago.total - abonado;
    if monto > saldo {
        return Err(BillingError::BalanceExceeded { monto, saldo });
    }
    if (saldo - monto).is_zero() {
        Ok(EstadoPago::Pagado)
    } else {
        Ok(pago.estado)
    }
}

/// Estado after an abono was removed and `abonado` is what remains.
pub fn estado_after_removal(pago: &MatriculaPago, abonado: Money) -> EstadoPago {
    match pago.estado {
        EstadoPago::Pagado if (pago.total - abonado).is_positive() => EstadoPago::Pendiente,
        estado => estado,
    }
}

impl PaymentLedger {
    pub fn new(db: DbConnection, locks: AggregateLocks) -> Self {
        let abono_repository = AbonoRepository::new(db.clone());
        Self {
            db,
            abono_repository,
            locks,
        }
    }

    pub async fn apply_abono(&self, command: ApplyAbonoCommand) -> BillingResult<Abono> {
        if !command.monto.is_positive() {
            return Err(ValidationError::invalid_range("monto", "must be greater than 0").into());
        }
        let pago_id = command.matricula_pago_id;
        let _guard = self.locks.acquire(pago_id).await;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        if !MatriculaPagoRepository::claim(&mut tx, pago_id, now).await? {
            return Err(BillingError::not_found("matricula pago", pago_id));
        }
        let pago = MatriculaPagoRepository::get_in(&mut tx, pago_id)
            .await?
            .ok_or_else(|| BillingError::not_found("matricula pago", pago_id))?;
        let abonado = AbonoRepository::sum_for_pago(&mut tx, pago_id).await?;

        let estado = match evaluate_abono(&pago, abonado, command.monto) {
            Ok(estado) => estado,
            Err(e) => {
                warn!(
                    "Rejected abono of {} on pago {} (total {}, abonado {}): {}",
                    command.monto, pago_id, pago.total, abonado, e
                );
                return Err(e);
            }
        };

        let new_abono = NewAbono {
            matricula_pago_id: pago_id,
            monto: command.monto,
            metodo_pago: command.metodo_pago,
            fecha_abono: now,
            referencia: command.referencia,
            nota: command.nota,
            usuario_id: command.usuario_id,
        };
        let id = AbonoRepository::insert(&mut tx, &new_abono).await?;
        if estado != pago.estado {
            MatriculaPagoRepository::update_estado(&mut tx, pago_id, estado, now).await?;
        }
        tx.commit().await?;

        info!(
            "Abono {} of {} applied to pago {} by usuario {}; saldo now {}",
            id,
            new_abono.monto,
            pago_id,
            new_abono.usuario_id,
            pago.total - abonado - new_abono.monto
        );

        Ok(Abono {
            id,
            matricula_pago_id: new_abono.matricula_pago_id,
            monto: new_abono.monto,
            metodo_pago: new_abono.metodo_pago,
            fecha_abono: new_abono.fecha_abono,
            referencia: new_abono.referencia,
            nota: new_abono.nota,
            usuario_id: new_abono.usuario_id,
        })
    }

    /// Deletes an abono and reopens a PAGADO invoice whose balance is owed
    /// again. ANULADO invoices keep their estado.
    pub async fn remove_abono(&self, abono_id: i64, usuario_id: i64) -> BillingResult<()> {
        let pago_id = self
            .abono_repository
            .get(abono_id)
            .await?
            .ok_or_else(|| BillingError::not_found("abono", abono_id))?
            .matricula_pago_id;
        let _guard = self.locks.acquire(pago_id).await;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        if !MatriculaPagoRepository::claim(&mut tx, pago_id, now).await? {
            return Err(BillingError::not_found("matricula pago", pago_id));
        }
        // it may have been removed while we waited for the lock
        if !AbonoRepository::delete(&mut tx, abono_id).await? {
            return Err(BillingError::not_found("abono", abono_id));
        }
        let pago = MatriculaPagoRepository::get_in(&mut tx, pago_id)
            .await?
            .ok_or_else(|| BillingError::not_found("matricula pago", pago_id))?;
        let abonado = AbonoRepository::sum_for_pago(&mut tx, pago_id).await?;

        let estado = estado_after_removal(&pago, abonado);
        if estado != pago.estado {
            MatriculaPagoRepository::update_estado(&mut tx, pago_id, estado, now).await?;
        }
        tx.commit().await?;

        info!(
            "Abono {} removed from pago {} by usuario {}; saldo now {}",
            abono_id,
            pago_id,
            usuario_id,
            pago.total - abonado
        );
        Ok(())
    }

    /// Snapshot of an invoice and its abonos, oldest first.
    pub async fn get_resumen(&self, pago_id: i64) -> BillingResult<ResumenAbonos> {
        let mut tx = self.db.begin().await?;
        let pago = MatriculaPagoRepository::get_in(&mut tx, pago_id)
            .await?
            .ok_or_else(|| BillingError::not_found("matricula pago", pago_id))?;
        let abonos = AbonoRepository::list_for_pago(&mut tx, pago_id).await?;
        tx.commit().await?;

        Ok(ResumenAbonos::project(&pago, abonos))
    }

    /// Saldo pendiente right after `abono_id` was applied.
    pub async fn historical_balance(&self, pago_id: i64, abono_id: i64) -> BillingResult<Money> {
        self.get_resumen(pago_id)
            .await?
            .balance_after(abono_id)
            .ok_or_else(|| BillingError::not_found("abono", abono_id))
    }

    pub async fn recibo(&self, abono_id: i64) -> BillingResult<ReciboAbono> {
        let abono = self
            .abono_repository
            .get(abono_id)
            .await?
            .ok_or_else(|| BillingError::not_found("abono", abono_id))?;
        self.get_resumen(abono.matricula_pago_id)
            .await?
            .recibo(abono_id)
            .ok_or_else(|| BillingError::not_found("abono", abono_id))
    }
}
