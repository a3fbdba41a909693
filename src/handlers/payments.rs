// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermPaiementsRead, PermPaiementsWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::finance::{Payment, PaymentPayload},
};

#[utoipa::path(
    get,
    path = "/api/documents/{id}/paiements",
    tag = "Paiements",
    responses((status = 200, description = "Pagamentos do documento", body = Vec<Payment>)),
    params(("id" = Uuid, Path, description = "ID do documento")),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermPaiementsRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let payments = app_state
        .finance_service
        .list_payments(&mut rls_conn, &user.0, tenant.0, id)
        .await?;
    Ok(Json(payments))
}

#[utoipa::path(
    post,
    path = "/api/documents/{id}/paiements",
    tag = "Paiements",
    request_body = PaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado, status regravado", body = Payment),
        (status = 422, description = "O pagamento ultrapassa o saldo")
    ),
    params(("id" = Uuid, Path, description = "ID do documento")),
    security(("api_jwt" = []))
)]
pub async fn add_payment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermPaiementsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let payment = app_state
        .finance_service
        .add_payment(&mut rls_conn, &user.0, tenant.0, id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    delete,
    path = "/api/paiements/{id}",
    tag = "Paiements",
    responses(
        (status = 204, description = "Pagamento removido, status regravado"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermPaiementsWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    app_state
        .finance_service
        .delete_payment(&mut rls_conn, &user.0, tenant.0, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
