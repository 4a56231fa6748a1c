//! Custom Axum extractors.
//!
//! - [`BearerToken`]: token from `Authorization: Bearer <token>`
//! - [`RequireAdmin`]: rejects requests without the configured admin token

use crate::error::AppError;
use crate::state::{AppState, Providers};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token.to_string()))
    }
}

/// Proof that the request carried the admin token.
///
/// Rejects with 403 when no token is configured and 401 when the header
/// is missing or wrong.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

#[async_trait]
impl<P: Providers> FromRequestParts<AppState<P>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<P>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(AppError::forbidden("Admin API is disabled"));
        };

        let bearer = BearerToken::from_request_parts(parts, state).await?;
        if !constant_time_eq::constant_time_eq(bearer.0.as_bytes(), expected.as_bytes()) {
            tracing::warn!("Rejected admin request with wrong token");
            return Err(AppError::unauthorized("Invalid admin token"));
        }

        Ok(Self)
    }
}
