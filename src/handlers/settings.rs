// src/handlers/settings.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermParametresRead, PermParametresWrite, RequireOwner, RequirePermission},
        tenancy::TenantContext,
    },
    models::auth::NewSocietePayload,
    models::tenancy::Societe,
};

// Rota "auth-only": conta aguardando convite cria a própria farmácia e
// vira dona. Não passa pelo tenant_guard.
#[utoipa::path(
    post,
    path = "/api/societes",
    tag = "Parametres",
    request_body = NewSocietePayload,
    responses(
        (status = 201, description = "Farmácia criada, criador vira dono", body = Societe),
        (status = 409, description = "Usuário já vinculado a uma farmácia")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_societe(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<NewSocietePayload>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let societe = app_state
        .tenancy_service
        .create_societe_for(&user.0, &payload)
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(societe)))
}

#[utoipa::path(
    get,
    path = "/api/parametres/societe",
    tag = "Parametres",
    responses((status = 200, description = "Dados da farmácia", body = Societe)),
    security(("api_jwt" = []))
)]
pub async fn get_societe(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermParametresRead>,
) -> Result<Json<Societe>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let societe = app_state
        .tenancy_service
        .get_societe(&mut rls_conn, tenant.0)
        .await?;
    Ok(Json(societe))
}

#[utoipa::path(
    put,
    path = "/api/parametres/societe",
    tag = "Parametres",
    request_body = NewSocietePayload,
    responses((status = 200, description = "Farmácia atualizada", body = Societe)),
    security(("api_jwt" = []))
)]
pub async fn update_societe(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermParametresWrite>,
    Json(payload): Json<NewSocietePayload>,
) -> Result<Json<Societe>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let societe = app_state
        .tenancy_service
        .update_societe(&mut rls_conn, &user.0, tenant.0, &payload)
        .await?;
    Ok(Json(societe))
}

// Invalida o código de adesão atual e sorteia outro. Só o dono.
#[utoipa::path(
    post,
    path = "/api/parametres/societe/code",
    tag = "Parametres",
    responses(
        (status = 200, description = "Novo código de adesão", body = Societe),
        (status = 403, description = "Apenas o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn regenerate_invite_code(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
) -> Result<Json<Societe>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let societe = app_state
        .tenancy_service
        .regenerate_invite_code(&mut rls_conn, &user.0, tenant.0)
        .await?;
    Ok(Json(societe))
}
