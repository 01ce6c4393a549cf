use crate::domain::commands::abonos::ApplyAbonoCommand;
use crate::domain::errors::ValidationError;
use crate::domain::models::{Abono as DomainAbono, MetodoPago as DomainMetodo};
use crate::domain::resumen::{ReciboAbono as DomainRecibo, ResumenAbonos as DomainResumen};
use crate::io::rest::mappers::{format_timestamp, parse_amount, PagoMapper};
use shared::{
    Abono as SharedAbono, CreateAbonoRequest, MetodoPago as SharedMetodo,
    ReciboAbono as SharedRecibo, ResumenAbonos as SharedResumen,
};

pub struct AbonoMapper;

impl AbonoMapper {
    pub fn to_command(request: CreateAbonoRequest, usuario_id: i64) -> Result<ApplyAbonoCommand, ValidationError> {
        Ok(ApplyAbonoCommand {
            matricula_pago_id: request.matricula_pago_id,
            monto: parse_amount("monto", &request.monto)?,
            metodo_pago: Self::to_domain_metodo(request.metodo_pago),
            referencia: non_blank(request.referencia),
            nota: non_blank(request.nota),
            usuario_id,
        })
    }

    pub fn to_dto(domain: DomainAbono) -> SharedAbono {
        SharedAbono {
            id: domain.id,
            matricula_pago_id: domain.matricula_pago_id,
            monto: domain.monto.to_string(),
            metodo_pago: Self::to_dto_metodo(domain.metodo_pago),
            fecha_abono: format_timestamp(&domain.fecha_abono),
            referencia: domain.referencia,
            nota: domain.nota,
            usuario_id: domain.usuario_id,
        }
    }

    pub fn to_resumen_dto(domain: DomainResumen) -> SharedResumen {
        SharedResumen {
            matricula_pago_id: domain.matricula_pago_id,
            estado: PagoMapper::to_dto_estado(domain.estado),
            total_pago: domain.total_pago.to_string(),
            total_abonado: domain.total_abonado.to_string(),
            saldo_pendiente: domain.saldo_pendiente.to_string(),
            abonos: domain.abonos.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_recibo_dto(domain: DomainRecibo) -> SharedRecibo {
        SharedRecibo {
            abono: Self::to_dto(domain.abono),
            total_pago: domain.total_pago.to_string(),
            saldo_anterior: domain.saldo_anterior.to_string(),
            saldo_pendiente: domain.saldo_pendiente.to_string(),
        }
    }

    fn to_domain_metodo(metodo: SharedMetodo) -> DomainMetodo {
        match metodo {
            SharedMetodo::Efectivo => DomainMetodo::Efectivo,
            SharedMetodo::Tarjeta => DomainMetodo::Tarjeta,
            SharedMetodo::Transferencia => DomainMetodo::Transferencia,
            SharedMetodo::Deposito => DomainMetodo::Deposito,
            SharedMetodo::Cheque => DomainMetodo::Cheque,
            SharedMetodo::Otro => DomainMetodo::Otro,
        }
    }

    fn to_dto_metodo(metodo: DomainMetodo) -> SharedMetodo {
        match metodo {
            DomainMetodo::Efectivo => SharedMetodo::Efectivo,
            DomainMetodo::Tarjeta => SharedMetodo::Tarjeta,
            DomainMetodo::Transferencia => SharedMetodo::Transferencia,
            DomainMetodo::Deposito => SharedMetodo::Deposito,
            DomainMetodo::Cheque => SharedMetodo::Cheque,
            DomainMetodo::Otro => SharedMetodo::Otro,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
