// src/handlers/invitations.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireOwner, tenancy::TenantContext},
    models::auth::User,
    models::tenancy::{Invitation, InvitationPayload, RedeemPayload},
};

// Rota "auth-only": quem está aguardando convite resgata um código aqui.
// Não passa pelo tenant_guard; a transação roda na pool principal.
#[utoipa::path(
    post,
    path = "/api/invitations/redeem",
    tag = "Invitations",
    request_body = RedeemPayload,
    responses(
        (status = 200, description = "Código resgatado, usuário vinculado", body = User),
        (status = 409, description = "Usuário já vinculado a uma farmácia"),
        (status = 422, description = "Código inválido, expirado ou de outro e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn redeem_invitation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<RedeemPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .tenancy_service
        .redeem_code(&user.0, &payload.code)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/invitations",
    tag = "Invitations",
    responses(
        (status = 200, description = "Convites da farmácia", body = Vec<Invitation>),
        (status = 403, description = "Apenas o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invitations(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
) -> Result<Json<Vec<Invitation>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let invitations = app_state
        .tenancy_service
        .list_invitations(&mut rls_conn, &user.0, tenant.0)
        .await?;
    Ok(Json(invitations))
}

#[utoipa::path(
    post,
    path = "/api/invitations",
    tag = "Invitations",
    request_body = InvitationPayload,
    responses(
        (status = 201, description = "Convite criado (válido por 7 dias)", body = Invitation),
        (status = 403, description = "Apenas o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireOwner,
    Json(payload): Json<InvitationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let invitation = app_state
        .tenancy_service
        .create_invitation(
            &mut rls_conn,
            &user.0,
            tenant.0,
            payload.role,
            payload.email.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}
