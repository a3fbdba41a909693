// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::CurrentUser,
    services::policy,
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
/// A tabela papel->permissões é código puro (services/policy.rs); a
/// checagem não faz I/O nenhum. As services re-checam a mesma regra na
/// fronteira de dados.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or(AppError::InvalidToken)?;

        policy::require(current, T::slug())?;
        Ok(RequirePermission(PhantomData))
    }
}

/// Guardião das rotas de gerência: só a flag de dono abre a porta.
pub struct RequireOwner;

impl<S> FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or(AppError::InvalidToken)?;

        policy::ensure_can_manage_users(current)?;
        Ok(RequireOwner)
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermAchatsRead;
impl PermissionDef for PermAchatsRead {
    fn slug() -> &'static str { "achats:read" }
}

pub struct PermAchatsWrite;
impl PermissionDef for PermAchatsWrite {
    fn slug() -> &'static str { "achats:write" }
}

pub struct PermVentesRead;
impl PermissionDef for PermVentesRead {
    fn slug() -> &'static str { "ventes:read" }
}

pub struct PermVentesWrite;
impl PermissionDef for PermVentesWrite {
    fn slug() -> &'static str { "ventes:write" }
}

pub struct PermStockRead;
impl PermissionDef for PermStockRead {
    fn slug() -> &'static str { "stock:read" }
}

pub struct PermStockWrite;
impl PermissionDef for PermStockWrite {
    fn slug() -> &'static str { "stock:write" }
}

pub struct PermFacturesRead;
impl PermissionDef for PermFacturesRead {
    fn slug() -> &'static str { "factures:read" }
}

pub struct PermPaiementsRead;
impl PermissionDef for PermPaiementsRead {
    fn slug() -> &'static str { "paiements:read" }
}

pub struct PermPaiementsWrite;
impl PermissionDef for PermPaiementsWrite {
    fn slug() -> &'static str { "paiements:write" }
}

pub struct PermParametresRead;
impl PermissionDef for PermParametresRead {
    fn slug() -> &'static str { "parametres:read" }
}

pub struct PermParametresWrite;
impl PermissionDef for PermParametresWrite {
    fn slug() -> &'static str { "parametres:write" }
}

pub struct PermTableauRead;
impl PermissionDef for PermTableauRead {
    fn slug() -> &'static str { "tableau:read" }
}
