// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use uuid::Uuid;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermFacturesRead, RequirePermission},
        tenancy::TenantContext,
    },
    models::operations::DocumentDetail,
};

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    responses(
        (status = 200, description = "Documento com linhas, total e soma paga", body = DocumentDetail),
        (status = 404, description = "Documento não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do documento")),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFacturesRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentDetail>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let detail = app_state
        .document_service
        .get_detail(&mut rls_conn, tenant.0, id)
        .await?;
    Ok(Json(detail))
}

// Versão imprimível: HTML autocontido, sem dependências externas
#[utoipa::path(
    get,
    path = "/api/documents/{id}/print",
    tag = "Documents",
    responses(
        (status = 200, description = "Fatura em HTML pronta para impressão", content_type = "text/html"),
        (status = 404, description = "Documento não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do documento")),
    security(("api_jwt" = []))
)]
pub async fn print_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFacturesRead>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let html = app_state
        .document_service
        .render_print(&mut rls_conn, tenant.0, id)
        .await?;
    Ok(Html(html))
}
