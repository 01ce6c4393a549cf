//! The staff member behind a write request.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the gateway has put the user id in `X-Usuario-Id`.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::errors::ValidationError;

pub const USUARIO_HEADER: &str = "x-usuario-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USUARIO_HEADER)
            .ok_or(ValidationError::RequiredField("X-Usuario-Id"))?;
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Actor)
            .ok_or_else(|| ValidationError::invalid_range("X-Usuario-Id", "must be a positive integer"))
    }
}
