use crate::domain::models::{EstadoPago as DomainEstado, MatriculaPago as DomainPago};
use crate::io::rest::mappers::format_timestamp;
use shared::{EstadoPago as SharedEstado, MatriculaPago as SharedPago};

pub struct PagoMapper;

impl PagoMapper {
    pub fn to_dto(domain: DomainPago) -> SharedPago {
        SharedPago {
            id: domain.id,
            matricula_id: domain.matricula_id,
            plan_pago_id: domain.plan_pago_id,
            numero_pago: domain.numero_pago,
            subtotal: domain.subtotal.to_string(),
            total: domain.total.to_string(),
            fecha_vencimiento: domain.fecha_vencimiento.format("%Y-%m-%d").to_string(),
            estado: Self::to_dto_estado(domain.estado),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_timestamp(&domain.updated_at),
        }
    }

    pub fn to_dto_estado(estado: DomainEstado) -> SharedEstado {
        match estado {
            DomainEstado::Pendiente => SharedEstado::Pendiente,
            DomainEstado::Pagado => SharedEstado::Pagado,
            DomainEstado::Vencido => SharedEstado::Vencido,
            DomainEstado::Anulado => SharedEstado::Anulado,
        }
    }
}
