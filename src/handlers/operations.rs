// src/handlers/operations.rs

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
        rbac::{
            PermAchatsRead, PermAchatsWrite, PermVentesRead, PermVentesWrite, RequirePermission,
        },
        tenancy::TenantContext,
    },
    models::operations::{Document, DocumentKind, DocumentPayload},
};

// ---
// Achats (compras a fornecedor)
// ---

#[utoipa::path(
    get,
    path = "/api/achats",
    tag = "Achats",
    responses((status = 200, description = "Compras da farmácia", body = Vec<Document>)),
    security(("api_jwt" = []))
)]
pub async fn list_achats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermAchatsRead>,
) -> Result<Json<Vec<Document>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let documents = app_state
        .operation_service
        .list(&mut rls_conn, &user.0, tenant.0, DocumentKind::Achat)
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    post,
    path = "/api/achats",
    tag = "Achats",
    request_body = DocumentPayload,
    responses(
        (status = 201, description = "Compra registrada, estoque atualizado", body = Document)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_achat(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermAchatsWrite>,
    Json(payload): Json<DocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let document = app_state
        .operation_service
        .create(&mut rls_conn, &user.0, tenant.0, DocumentKind::Achat, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    put,
    path = "/api/achats/{id}",
    tag = "Achats",
    request_body = DocumentPayload,
    responses(
        (status = 200, description = "Compra atualizada (número preservado)", body = Document),
        (status = 404, description = "Compra não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da compra")),
    security(("api_jwt" = []))
)]
pub async fn update_achat(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermAchatsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<Document>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let document = app_state
        .operation_service
        .update(&mut rls_conn, &user.0, tenant.0, DocumentKind::Achat, id, &payload)
        .await?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/achats/{id}",
    tag = "Achats",
    responses(
        (status = 204, description = "Compra excluída, estoque revertido"),
        (status = 404, description = "Compra não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da compra")),
    security(("api_jwt" = []))
)]
pub async fn delete_achat(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermAchatsWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    app_state
        .operation_service
        .delete(&mut rls_conn, &user.0, tenant.0, DocumentKind::Achat, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Ventes (vendas a cliente)
// ---

#[utoipa::path(
    get,
    path = "/api/ventes",
    tag = "Ventes",
    responses((status = 200, description = "Vendas da farmácia", body = Vec<Document>)),
    security(("api_jwt" = []))
)]
pub async fn list_ventes(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermVentesRead>,
) -> Result<Json<Vec<Document>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let documents = app_state
        .operation_service
        .list(&mut rls_conn, &user.0, tenant.0, DocumentKind::Vente)
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    post,
    path = "/api/ventes",
    tag = "Ventes",
    request_body = DocumentPayload,
    responses(
        (status = 201, description = "Venda registrada, estoque deduzido", body = Document),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vente(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermVentesWrite>,
    Json(payload): Json<DocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let document = app_state
        .operation_service
        .create(&mut rls_conn, &user.0, tenant.0, DocumentKind::Vente, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    put,
    path = "/api/ventes/{id}",
    tag = "Ventes",
    request_body = DocumentPayload,
    responses(
        (status = 200, description = "Venda atualizada (número preservado)", body = Document),
        (status = 404, description = "Venda não encontrada"),
        (status = 422, description = "Estoque insuficiente para as novas linhas")
    ),
    params(("id" = Uuid, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn update_vente(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermVentesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<Document>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let document = app_state
        .operation_service
        .update(&mut rls_conn, &user.0, tenant.0, DocumentKind::Vente, id, &payload)
        .await?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/api/ventes/{id}",
    tag = "Ventes",
    responses(
        (status = 204, description = "Venda excluída, estoque devolvido"),
        (status = 404, description = "Venda não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn delete_vente(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermVentesWrite>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    app_state
        .operation_service
        .delete(&mut rls_conn, &user.0, tenant.0, DocumentKind::Vente, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
