// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermTableauRead, RequirePermission},
        tenancy::TenantContext,
    },
    services::dashboard_service::DashboardSummary,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses((status = 200, description = "Resumo do dia", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermTableauRead>,
) -> Result<Json<DashboardSummary>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let summary = app_state
        .dashboard_service
        .summary(&mut rls_conn, tenant.0)
        .await?;
    Ok(Json(summary))
}
