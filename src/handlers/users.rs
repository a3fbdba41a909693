// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireOwner, tenancy::TenantContext},
    models::auth::{ChangeRolePayload, SetLockedPayload, User},
};

// Todas as rotas daqui passam pelo RequireOwner: papel nenhum substitui a
// flag de dono.

#[utoipa::path(
    get,
    path = "/api/utilisateurs",
    tag = "Utilisateurs",
    responses(
        (status = 200, description = "Equipe da farmácia", body = Vec<User>),
        (status = 403, description = "Apenas o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
) -> Result<Json<Vec<User>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let users = app_state
        .user_service
        .list_team(&mut rls_conn, &user.0, tenant.0)
        .await?;
    Ok(Json(users))
}

#[utoipa::path(
    put,
    path = "/api/utilisateurs/{id}/role",
    tag = "Utilisateurs",
    request_body = ChangeRolePayload,
    responses(
        (status = 200, description = "Papel alterado", body = User),
        (status = 403, description = "Dono imutável, auto-alteração, ou não-dono")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário-alvo")),
    security(("api_jwt" = []))
)]
pub async fn change_role(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRolePayload>,
) -> Result<Json<User>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let updated = app_state
        .user_service
        .change_role(&mut rls_conn, &user.0, tenant.0, id, payload.role)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    put,
    path = "/api/utilisateurs/{id}/verrou",
    tag = "Utilisateurs",
    request_body = SetLockedPayload,
    responses(
        (status = 200, description = "Bloqueio alterado", body = User),
        (status = 403, description = "Dono imutável, auto-alteração, ou não-dono")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário-alvo")),
    security(("api_jwt" = []))
)]
pub async fn set_locked(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetLockedPayload>,
) -> Result<Json<User>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let updated = app_state
        .user_service
        .set_locked(&mut rls_conn, &user.0, tenant.0, id, payload.locked)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/utilisateurs/{id}",
    tag = "Utilisateurs",
    responses(
        (status = 204, description = "Usuário excluído (soft delete)"),
        (status = 403, description = "Dono imutável, auto-alteração, ou não-dono")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário-alvo")),
    security(("api_jwt" = []))
)]
pub async fn remove_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    app_state
        .user_service
        .remove(&mut rls_conn, &user.0, tenant.0, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
