//! Error taxonomy shared by the plan engine and the payment ledger.

use thiserror::Error;

use crate::domain::money::Money;

/// Input problems. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    RequiredField(&'static str),

    #[error("{field} {reason}")]
    InvalidRange { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid_range(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidRange {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BillingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("abono of {monto} exceeds saldo pendiente of {saldo}")]
    BalanceExceeded { monto: Money, saldo: Money },

    #[error("{0}")]
    InvalidState(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl BillingError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        BillingError::NotFound { entity, id }
    }

    /// Stable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::Validation(ValidationError::RequiredField(_)) => "RequiredField",
            BillingError::Validation(ValidationError::InvalidRange { .. }) => "InvalidRange",
            BillingError::BalanceExceeded { .. } => "BalanceExceeded",
            BillingError::InvalidState(_) => "InvalidState",
            BillingError::NotFound { .. } => "NotFound",
            BillingError::Storage(_) => "Storage",
        }
    }
}

impl From<sqlx::Error> for BillingError {
    fn from(error: sqlx::Error) -> Self {
        BillingError::Storage(error.into())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
