//! Read-only catalog entries owned by other parts of the console.
use rust_decimal::Decimal;

use crate::domain::errors::ValidationError;
use crate::domain::money::parse_percentage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Impuesto {
    pub id: i64,
    pub nombre: String,
    /// Percentage as entered in the catalog, e.g. `"13"`
    pub porcentaje: String,
}

impl Impuesto {
    /// The rate as a fraction (`"13"` → 0.13).
    pub fn tasa(&self) -> Result<Decimal, ValidationError> {
        let tasa = parse_percentage(&self.porcentaje)
            .map_err(|e| ValidationError::invalid_range("porcentaje", e.to_string()))?;
        if tasa.is_sign_negative() {
            return Err(ValidationError::invalid_range("porcentaje", "must not be negative"));
        }
        Ok(tasa)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moneda {
    pub id: i64,
    pub codigo: String,
    pub simbolo: String,
    pub nombre: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasa_from_percentage() {
        let iva = Impuesto {
            id: 1,
            nombre: "IVA".to_string(),
            porcentaje: "13".to_string(),
        };
        assert_eq!(iva.tasa().unwrap(), Decimal::new(13, 2));

        let broken = Impuesto {
            porcentaje: "-5".to_string(),
            ..iva
        };
        assert!(broken.tasa().is_err());
    }
}
