// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::CurrentUser};

/// A société da sessão, derivada da identidade resolvida.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

// Barreira de tenant: tudo atrás dela exige um usuário JÁ vinculado a uma
// société. Quem está "aguardando convite" só alcança /auth/*.
pub async fn tenant_guard(
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::InvalidToken)?;

    let tenant_id = current.tenant_id.ok_or(AppError::NoTenant)?;

    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::NoTenant)
    }
}
