//! Translation of domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, info};

use crate::domain::errors::{BillingError, ValidationError};
use shared::ErrorResponse;

impl BillingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::Validation(_) => StatusCode::BAD_REQUEST,
            BillingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BillingError::BalanceExceeded { .. } | BillingError::InvalidState(_) => StatusCode::CONFLICT,
            BillingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BillingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            BillingError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                "internal storage error".to_string()
            }
            other => {
                info!("Request rejected ({}): {}", other.code(), other);
                other.to_string()
            }
        };
        let body = ErrorResponse {
            error: self.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        BillingError::from(self).into_response()
    }
}
