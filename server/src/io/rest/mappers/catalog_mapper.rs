use crate::domain::models::{Impuesto as DomainImpuesto, Moneda as DomainMoneda};
use shared::{Impuesto as SharedImpuesto, Moneda as SharedMoneda};

pub struct CatalogMapper;

impl CatalogMapper {
    pub fn impuesto_to_dto(domain: DomainImpuesto) -> SharedImpuesto {
        SharedImpuesto {
            id: domain.id,
            nombre: domain.nombre,
            porcentaje: domain.porcentaje,
        }
    }

    pub fn moneda_to_dto(domain: DomainMoneda) -> SharedMoneda {
        SharedMoneda {
            id: domain.id,
            codigo: domain.codigo,
            simbolo: domain.simbolo,
            nombre: domain.nombre,
        }
    }
}
