//! Resolve the caller from the `Authorization: Bearer <jwt>` header.

use crate::authz::Caller;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

pub const BEARER_PREFIX: &str = "Bearer ";

/// No header yields [`Caller::Anonymous`]; a header that is not a valid,
/// unexpired token is rejected with 401 even on public routes.
#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller::Anonymous);
        };
        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("expected a bearer token".into()))?;
        let claims = state.tokens.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Unauthenticated("invalid or expired token".into())
        })?;
        Ok(claims.caller())
    }
}
