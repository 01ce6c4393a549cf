//! Field derivation for payment plans.
//!
//! A plan carries five amounts that depend on each other through the tax
//! rate and the cuota count. [`derive`] takes the plan as the user left it,
//! which field they touched last, and the active rate, and returns a state
//! where every dependent amount has been recomputed from the edited one.
//!
//! Every step rounds half-up to cents, so going `subtotal → total →
//! subtotal` can drift by one cent. That drift is accepted.

use rust_decimal::Decimal;

use crate::domain::errors::ValidationError;
use crate::domain::models::{PlanState, TipoPago};
use crate::domain::money::{tax_factor, Money};

pub const NOMBRE_MAX_CHARS: usize = 150;

/// The field whose value the others are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditedField {
    Subtotal,
    Total,
    SubtotalFinal,
    TotalFinal,
    NumeroCuotas,
    TaxRateChanged,
    /// The plan type switched; stale groups are cleared and the cuota
    /// finals are rebuilt when switching into `Cuotas`.
    TipoPago,
}

/// Recomputes every field that depends on `edited`.
///
/// Edits to cuota fields on a non-`Cuotas` plan, or with no usable cuota
/// count, leave the amounts unchanged. Fails with `InvalidRange` on the
/// first amount that would not fit.
pub fn derive(state: PlanState, edited: EditedField, tax_rate: Decimal) -> Result<PlanState, ValidationError> {
    let factor = tax_factor(tax_rate).ok_or_else(|| too_large("tasaImpuesto"))?;
    let mut next = state;

    match edited {
        EditedField::Subtotal => {
            next.total = gross_up(next.subtotal, factor)?;
            rescale_finals(&mut next)?;
        }
        EditedField::Total => {
            next.subtotal = net_of_tax(next.total, factor)?;
            rescale_finals(&mut next)?;
        }
        EditedField::SubtotalFinal => {
            if let (Some(cuotas), Some(subtotal_final)) = (next.cuotas(), next.subtotal_final) {
                let subtotal = subtotal_final
                    .divide_by_int(cuotas)
                    .ok_or_else(|| too_large("subtotalFinal"))?;
                next.subtotal = subtotal;
                next.total = gross_up(subtotal, factor)?;
                next.total_final = Some(next.total.multiply_by_int(cuotas).ok_or_else(|| too_large("totalFinal"))?);
            }
        }
        EditedField::TotalFinal => {
            if let (Some(cuotas), Some(total_final)) = (next.cuotas(), next.total_final) {
                let total = total_final
                    .divide_by_int(cuotas)
                    .ok_or_else(|| too_large("totalFinal"))?;
                next.total = total;
                next.subtotal = net_of_tax(total, factor)?;
                next.subtotal_final = Some(
                    next.subtotal
                        .multiply_by_int(cuotas)
                        .ok_or_else(|| too_large("subtotalFinal"))?,
                );
            }
        }
        EditedField::NumeroCuotas => {
            if next.tipo_pago == TipoPago::Cuotas {
                if next.cuotas().is_some() {
                    rescale_finals(&mut next)?;
                } else {
                    next.subtotal_final = None;
                    next.total_final = None;
                }
            }
        }
        EditedField::TaxRateChanged => {
            if next.subtotal.is_positive() {
                next.total = gross_up(next.subtotal, factor)?;
                rescale_finals(&mut next)?;
            } else if next.total.is_positive() {
                next.subtotal = net_of_tax(next.total, factor)?;
                rescale_finals(&mut next)?;
            }
        }
        EditedField::TipoPago => {
            next = next.normalized();
            rescale_finals(&mut next)?;
        }
    }

    Ok(next)
}

/// The amount edit under which `state` is already fully derived, if any.
///
/// A state the client obtained from [`derive`] is a fixed point of the edit
/// that produced it, so saving it must not move the amount the user typed.
pub fn consistent_edit(state: &PlanState, tax_rate: Decimal) -> Option<EditedField> {
    [
        EditedField::Subtotal,
        EditedField::Total,
        EditedField::SubtotalFinal,
        EditedField::TotalFinal,
    ]
    .into_iter()
    .filter(|edited| drives_amounts(state, *edited))
    .find(|edited| derive(state.clone(), *edited, tax_rate).map_or(false, |derived| &derived == state))
}

/// Picks the edit that should drive a server-side recomputation of an
/// inconsistent state: unit amounts win, and a plan that only carries
/// finals is rebuilt from them.
pub fn authoritative_edit(state: &PlanState) -> EditedField {
    if state.subtotal.is_positive() || state.total.is_positive() {
        return EditedField::TaxRateChanged;
    }
    match (state.cuotas(), state.subtotal_final, state.total_final) {
        (Some(_), Some(subtotal_final), _) if subtotal_final.is_positive() => {
            EditedField::SubtotalFinal
        }
        (Some(_), _, Some(total_final)) if total_final.is_positive() => EditedField::TotalFinal,
        _ => EditedField::TaxRateChanged,
    }
}

/// Checks a plan before it is persisted. Never mutates.
pub fn validate(state: &PlanState) -> Result<(), ValidationError> {
    let nombre = state.nombre.trim();
    if nombre.is_empty() {
        return Err(ValidationError::RequiredField("nombre"));
    }
    if nombre.chars().count() > NOMBRE_MAX_CHARS {
        return Err(ValidationError::invalid_range(
            "nombre",
            format!("must be at most {} characters", NOMBRE_MAX_CHARS),
        ));
    }
    if state.id_moneda.is_none() {
        return Err(ValidationError::RequiredField("idMoneda"));
    }
    if state.id_impuesto.is_none() {
        return Err(ValidationError::RequiredField("idImpuesto"));
    }
    if state.subtotal.is_negative() {
        return Err(ValidationError::invalid_range("subtotal", "must not be negative"));
    }
    if !state.total.is_positive() {
        return Err(ValidationError::invalid_range("total", "must be greater than 0"));
    }

    match state.tipo_pago {
        TipoPago::Unico => {}
        TipoPago::Recurrente => match state.periodicidad_valor {
            None => return Err(ValidationError::RequiredField("periodicidadValor")),
            Some(0) => {
                return Err(ValidationError::invalid_range(
                    "periodicidadValor",
                    "must be at least 1",
                ))
            }
            Some(_) if state.periodicidad_unidad.is_none() => {
                return Err(ValidationError::RequiredField("periodicidadUnidad"))
            }
            Some(_) => {}
        },
        TipoPago::Cuotas => match state.numero_cuotas {
            None => return Err(ValidationError::RequiredField("numeroCuotas")),
            Some(0) => {
                return Err(ValidationError::invalid_range("numeroCuotas", "must be at least 1"))
            }
            Some(_) => {}
        },
    }

    Ok(())
}

fn drives_amounts(state: &PlanState, edited: EditedField) -> bool {
    match edited {
        EditedField::Subtotal | EditedField::Total => true,
        EditedField::SubtotalFinal => state.cuotas().is_some() && state.subtotal_final.is_some(),
        EditedField::TotalFinal => state.cuotas().is_some() && state.total_final.is_some(),
        _ => false,
    }
}

fn too_large(field: &'static str) -> ValidationError {
    ValidationError::invalid_range(field, "is too large")
}

fn gross_up(subtotal: Money, factor: Decimal) -> Result<Money, ValidationError> {
    subtotal.multiply_by_rate(factor).ok_or_else(|| too_large("total"))
}

fn net_of_tax(total: Money, factor: Decimal) -> Result<Money, ValidationError> {
    // factor is 1 + rate with rate >= 0, never zero
    total.divide_by_rate(factor).ok_or_else(|| too_large("subtotal"))
}

fn rescale_finals(state: &mut PlanState) -> Result<(), ValidationError> {
    if let Some(cuotas) = state.cuotas() {
        state.subtotal_final = Some(
            state
                .subtotal
                .multiply_by_int(cuotas)
                .ok_or_else(|| too_large("subtotalFinal"))?,
        );
        state.total_final = Some(state.total.multiply_by_int(cuotas).ok_or_else(|| too_large("totalFinal"))?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PeriodicidadUnidad;

    fn iva() -> Decimal {
        Decimal::new(13, 2)
    }

    fn cents(value: i64) -> Money {
        Money::from_cents(value)
    }

    fn cuotas_plan(numero_cuotas: u32) -> PlanState {
        let mut state = PlanState::new("Diplomado", TipoPago::Cuotas);
        state.numero_cuotas = Some(numero_cuotas);
        state.id_moneda = Some(1);
        state.id_impuesto = Some(1);
        state
    }

    #[test]
    fn test_cuotas_example_from_subtotal() {
        let mut state = cuotas_plan(3);
        state.subtotal = cents(10000);

        let derived = derive(state, EditedField::Subtotal, iva()).unwrap();

        assert_eq!(derived.total, cents(11300));
        assert_eq!(derived.subtotal_final, Some(cents(30000)));
        assert_eq!(derived.total_final, Some(cents(33900)));
    }

    #[test]
    fn test_total_edit_back_derives_subtotal() {
        let mut state = cuotas_plan(3);
        state.total = cents(11300);

        let derived = derive(state, EditedField::Total, iva()).unwrap();

        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.subtotal_final, Some(cents(30000)));
        assert_eq!(derived.total_final, Some(cents(33900)));
    }

    #[test]
    fn test_subtotal_final_edit() {
        let mut state = cuotas_plan(4);
        state.subtotal_final = Some(cents(40000));

        let derived = derive(state, EditedField::SubtotalFinal, iva()).unwrap();

        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.total, cents(11300));
        assert_eq!(derived.total_final, Some(cents(45200)));
        assert_eq!(derived.subtotal_final, Some(cents(40000)));
    }

    #[test]
    fn test_total_final_edit() {
        let mut state = cuotas_plan(3);
        state.total_final = Some(cents(33900));

        let derived = derive(state, EditedField::TotalFinal, iva()).unwrap();

        assert_eq!(derived.total, cents(11300));
        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.subtotal_final, Some(cents(30000)));
    }

    #[test]
    fn test_numero_cuotas_keeps_unit_amount() {
        let mut state = cuotas_plan(3);
        state.subtotal = cents(10000);
        let state = derive(state, EditedField::Subtotal, iva()).unwrap();

        let mut state = state;
        state.numero_cuotas = Some(6);
        let derived = derive(state, EditedField::NumeroCuotas, iva()).unwrap();

        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.total, cents(11300));
        assert_eq!(derived.subtotal_final, Some(cents(60000)));
        assert_eq!(derived.total_final, Some(cents(67800)));
    }

    #[test]
    fn test_numero_cuotas_cleared_drops_finals() {
        let mut state = cuotas_plan(3);
        state.subtotal = cents(10000);
        let mut state = derive(state, EditedField::Subtotal, iva()).unwrap();
        state.numero_cuotas = None;

        let derived = derive(state, EditedField::NumeroCuotas, iva()).unwrap();
        assert_eq!(derived.subtotal_final, None);
        assert_eq!(derived.total_final, None);
    }

    #[test]
    fn test_cuota_edits_ignored_outside_cuotas() {
        let mut state = PlanState::new("Inscripcion", TipoPago::Unico);
        state.subtotal = cents(5000);
        state.total = cents(5650);
        state.subtotal_final = Some(cents(99999));

        let derived = derive(state.clone(), EditedField::SubtotalFinal, iva()).unwrap();
        assert_eq!(derived, state);
    }

    #[test]
    fn test_tax_rate_change_prefers_subtotal() {
        let mut state = cuotas_plan(2);
        state.subtotal = cents(10000);
        state.total = cents(11300);

        let derived = derive(state, EditedField::TaxRateChanged, Decimal::ZERO).unwrap();
        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.total, cents(10000));
        assert_eq!(derived.total_final, Some(cents(20000)));
    }

    #[test]
    fn test_tax_rate_change_falls_back_to_total() {
        let mut state = PlanState::new("Inscripcion", TipoPago::Unico);
        state.total = cents(11300);

        let derived = derive(state, EditedField::TaxRateChanged, iva()).unwrap();
        assert_eq!(derived.subtotal, cents(10000));
        assert_eq!(derived.total, cents(11300));
    }

    #[test]
    fn test_tipo_pago_switch_clears_and_rebuilds() {
        let mut state = cuotas_plan(3);
        state.subtotal = cents(10000);
        let mut state = derive(state, EditedField::Subtotal, iva()).unwrap();

        state.tipo_pago = TipoPago::Unico;
        let unico = derive(state, EditedField::TipoPago, iva()).unwrap();
        assert_eq!(unico.numero_cuotas, None);
        assert_eq!(unico.total_final, None);

        let mut back = unico;
        back.tipo_pago = TipoPago::Cuotas;
        back.numero_cuotas = Some(2);
        let cuotas = derive(back, EditedField::TipoPago, iva()).unwrap();
        assert_eq!(cuotas.subtotal_final, Some(cents(20000)));
        assert_eq!(cuotas.total_final, Some(cents(22600)));
    }

    #[test]
    fn test_round_trip_within_one_cent() {
        let rates = [
            Decimal::ZERO,
            Decimal::new(5, 2),
            iva(),
            Decimal::new(16, 2),
            Decimal::new(999, 3),
        ];
        for rate in rates {
            for subtotal in (0..5_000).step_by(7) {
                let mut state = PlanState::new("Curso", TipoPago::Unico);
                state.subtotal = cents(subtotal);
                let forward = derive(state, EditedField::Subtotal, rate).unwrap();
                let back = derive(forward.clone(), EditedField::Total, rate).unwrap();

                assert_eq!(forward.total, cents(subtotal).multiply_by_rate(tax_factor(rate).unwrap()).unwrap());
                let drift = (back.subtotal.cents() - subtotal).abs();
                assert!(drift <= 1, "rate {} subtotal {} drifted {}", rate, subtotal, drift);
            }
        }
    }

    #[test]
    fn test_derived_state_is_its_own_fixed_point() {
        let mut state = PlanState::new("Inscripcion", TipoPago::Unico);
        state.total = cents(3333);
        let derived = derive(state, EditedField::Total, iva()).unwrap();
        assert_eq!(derived.subtotal, cents(2950));

        // 29.50 grossed up is 33.34, so only the total edit reproduces it
        assert_eq!(consistent_edit(&derived, iva()), Some(EditedField::Total));

        let mut cuotas = cuotas_plan(3);
        cuotas.total_final = Some(cents(10000));
        let derived = derive(cuotas, EditedField::TotalFinal, iva()).unwrap();
        assert_eq!(derived.total, cents(3333));
        assert_eq!(consistent_edit(&derived, iva()), Some(EditedField::TotalFinal));

        let mut stale = derived;
        stale.total = cents(5000);
        assert_eq!(consistent_edit(&stale, iva()), None);
    }

    #[test]
    fn test_overflow_is_invalid_range() {
        let mut state = cuotas_plan(3);
        state.subtotal = "90000000000000000.00".parse().unwrap();

        let result = derive(state.clone(), EditedField::Subtotal, iva());
        assert!(matches!(result, Err(ValidationError::InvalidRange { field: "total", .. })));

        let result = derive(state, EditedField::Subtotal, Decimal::ZERO);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidRange { field: "subtotalFinal", .. })
        ));
    }

    #[test]
    fn test_authoritative_edit() {
        let mut state = cuotas_plan(3);
        state.total_final = Some(cents(33900));
        assert_eq!(authoritative_edit(&state), EditedField::TotalFinal);

        state.subtotal_final = Some(cents(30000));
        assert_eq!(authoritative_edit(&state), EditedField::SubtotalFinal);

        state.total = cents(11300);
        assert_eq!(authoritative_edit(&state), EditedField::TaxRateChanged);
    }

    #[test]
    fn test_validate_rules() {
        let mut state = cuotas_plan(3);
        state.subtotal = cents(10000);
        let state = derive(state, EditedField::Subtotal, iva()).unwrap();
        assert_eq!(validate(&state), Ok(()));

        let mut blank = state.clone();
        blank.nombre = "   ".to_string();
        assert_eq!(validate(&blank), Err(ValidationError::RequiredField("nombre")));

        let mut long = state.clone();
        long.nombre = "x".repeat(NOMBRE_MAX_CHARS + 1);
        assert!(matches!(validate(&long), Err(ValidationError::InvalidRange { field: "nombre", .. })));

        let mut no_moneda = state.clone();
        no_moneda.id_moneda = None;
        assert_eq!(validate(&no_moneda), Err(ValidationError::RequiredField("idMoneda")));

        let mut no_impuesto = state.clone();
        no_impuesto.id_impuesto = None;
        assert_eq!(validate(&no_impuesto), Err(ValidationError::RequiredField("idImpuesto")));

        let mut zero_total = state.clone();
        zero_total.total = Money::zero();
        assert!(matches!(validate(&zero_total), Err(ValidationError::InvalidRange { field: "total", .. })));

        let mut zero_cuotas = state.clone();
        zero_cuotas.numero_cuotas = Some(0);
        assert!(matches!(
            validate(&zero_cuotas),
            Err(ValidationError::InvalidRange { field: "numeroCuotas", .. })
        ));
    }

    #[test]
    fn test_validate_recurrente_needs_periodicidad() {
        let mut state = PlanState::new("Mensualidad", TipoPago::Recurrente);
        state.id_moneda = Some(1);
        state.id_impuesto = Some(2);
        state.subtotal = cents(2500);
        state.total = cents(2500);
        assert_eq!(validate(&state), Err(ValidationError::RequiredField("periodicidadValor")));

        state.periodicidad_valor = Some(0);
        assert!(validate(&state).is_err());

        state.periodicidad_valor = Some(1);
        assert_eq!(validate(&state), Err(ValidationError::RequiredField("periodicidadUnidad")));

        state.periodicidad_unidad = Some(PeriodicidadUnidad::Meses);
        assert_eq!(validate(&state), Ok(()));
    }
}
