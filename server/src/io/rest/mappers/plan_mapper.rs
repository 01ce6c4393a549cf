use crate::domain::errors::ValidationError;
use crate::domain::models::{
    PeriodicidadUnidad as DomainPeriodicidad, PlanPago as DomainPlanPago, PlanState,
    TipoPago as DomainTipoPago,
};
use crate::domain::plan_derivation::EditedField;
use crate::domain::plan_service::DerivedPlan;
use crate::io::rest::mappers::{format_timestamp, parse_optional_amount};
use shared::{
    CampoEditado, PeriodicidadUnidad as SharedPeriodicidad, PlanPago as SharedPlanPago,
    PlanPagoCalculo, PlanPagoRequest, TipoPago as SharedTipoPago,
};

pub struct PlanMapper;

impl PlanMapper {
    /// Builds the plan state from a request. Missing amounts count as zero
    /// so the derivation engine can fill them in.
    pub fn to_state(request: PlanPagoRequest) -> Result<PlanState, ValidationError> {
        let tipo_pago = request
            .tipo_pago
            .ok_or(ValidationError::RequiredField("tipoPago"))?;

        let mut state = PlanState::new(request.nombre, Self::to_domain_tipo(tipo_pago));
        state.descripcion = request.descripcion.filter(|d| !d.trim().is_empty());
        state.subtotal = parse_optional_amount("subtotal", request.subtotal.as_deref())?.unwrap_or_default();
        state.total = parse_optional_amount("total", request.total.as_deref())?.unwrap_or_default();
        state.periodicidad_valor = request.periodicidad_valor;
        state.periodicidad_unidad = request.periodicidad_unidad.map(Self::to_domain_periodicidad);
        state.numero_cuotas = request.numero_cuotas;
        state.subtotal_final = parse_optional_amount("subtotalFinal", request.subtotal_final.as_deref())?;
        state.total_final = parse_optional_amount("totalFinal", request.total_final.as_deref())?;
        state.id_impuesto = request.id_impuesto;
        state.id_moneda = request.id_moneda;
        state.activo = request.activo.unwrap_or(true);
        Ok(state)
    }

    pub fn to_dto(domain: DomainPlanPago) -> SharedPlanPago {
        let state = domain.state;
        SharedPlanPago {
            id: domain.id,
            nombre: state.nombre,
            descripcion: state.descripcion,
            tipo_pago: Self::to_dto_tipo(state.tipo_pago),
            subtotal: state.subtotal.to_string(),
            total: state.total.to_string(),
            periodicidad_valor: state.periodicidad_valor,
            periodicidad_unidad: state.periodicidad_unidad.map(Self::to_dto_periodicidad),
            numero_cuotas: state.numero_cuotas,
            subtotal_final: state.subtotal_final.map(|m| m.to_string()),
            total_final: state.total_final.map(|m| m.to_string()),
            id_impuesto: state.id_impuesto,
            id_moneda: state.id_moneda,
            activo: state.activo,
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_timestamp(&domain.updated_at),
        }
    }

    pub fn to_calculo(derived: DerivedPlan) -> PlanPagoCalculo {
        let state = derived.state;
        PlanPagoCalculo {
            tipo_pago: Self::to_dto_tipo(state.tipo_pago),
            tasa_impuesto: derived.tasa_impuesto.normalize().to_string(),
            subtotal: state.subtotal.to_string(),
            total: state.total.to_string(),
            numero_cuotas: state.numero_cuotas,
            subtotal_final: state.subtotal_final.map(|m| m.to_string()),
            total_final: state.total_final.map(|m| m.to_string()),
        }
    }

    pub fn to_edited_field(campo: CampoEditado) -> EditedField {
        match campo {
            CampoEditado::Subtotal => EditedField::Subtotal,
            CampoEditado::Total => EditedField::Total,
            CampoEditado::SubtotalFinal => EditedField::SubtotalFinal,
            CampoEditado::TotalFinal => EditedField::TotalFinal,
            CampoEditado::NumeroCuotas => EditedField::NumeroCuotas,
            CampoEditado::Impuesto => EditedField::TaxRateChanged,
            CampoEditado::TipoPago => EditedField::TipoPago,
        }
    }

    fn to_domain_tipo(tipo: SharedTipoPago) -> DomainTipoPago {
        match tipo {
            SharedTipoPago::Unico => DomainTipoPago::Unico,
            SharedTipoPago::Recurrente => DomainTipoPago::Recurrente,
            SharedTipoPago::Cuotas => DomainTipoPago::Cuotas,
        }
    }

    fn to_dto_tipo(tipo: DomainTipoPago) -> SharedTipoPago {
        match tipo {
            DomainTipoPago::Unico => SharedTipoPago::Unico,
            DomainTipoPago::Recurrente => SharedTipoPago::Recurrente,
            DomainTipoPago::Cuotas => SharedTipoPago::Cuotas,
        }
    }

    fn to_domain_periodicidad(unidad: SharedPeriodicidad) -> DomainPeriodicidad {
        match unidad {
            SharedPeriodicidad::Dias => DomainPeriodicidad::Dias,
            SharedPeriodicidad::Semanas => DomainPeriodicidad::Semanas,
            SharedPeriodicidad::Meses => DomainPeriodicidad::Meses,
            SharedPeriodicidad::Anios => DomainPeriodicidad::Anios,
        }
    }

    fn to_dto_periodicidad(unidad: DomainPeriodicidad) -> SharedPeriodicidad {
        match unidad {
            DomainPeriodicidad::Dias => SharedPeriodicidad::Dias,
            DomainPeriodicidad::Semanas => SharedPeriodicidad::Semanas,
            DomainPeriodicidad::Meses => SharedPeriodicidad::Meses,
            DomainPeriodicidad::Anios => SharedPeriodicidad::Anios,
        }
    }
}

