// src/handlers/stock.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::db_utils::get_rls_connection,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermStockRead, PermStockWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::stock::{ConfigureStockPayload, StockItem, StockLot},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItemDetail {
    #[serde(flatten)]
    pub item: StockItem,
    pub lots: Vec<StockLot>,
}

#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Stock",
    responses((status = 200, description = "Estoque da farmácia", body = Vec<StockItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermStockRead>,
) -> Result<Json<Vec<StockItem>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let items = app_state.stock_service.list(&mut rls_conn, tenant.0).await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/stock/{id}",
    tag = "Stock",
    responses(
        (status = 200, description = "Produto com seus lotes", body = StockItemDetail),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn get_stock_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermStockRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockItemDetail>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let (item, lots) = app_state
        .stock_service
        .detail(&mut rls_conn, tenant.0, id)
        .await?;
    Ok(Json(StockItemDetail { item, lots }))
}

// Só limiar e preço de venda são editáveis; quantidade muda via documentos
#[utoipa::path(
    put,
    path = "/api/stock/{id}",
    tag = "Stock",
    request_body = ConfigureStockPayload,
    responses(
        (status = 200, description = "Produto ajustado", body = StockItem),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn configure_stock_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermStockWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfigureStockPayload>,
) -> Result<Json<StockItem>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;
    let item = app_state
        .stock_service
        .configure_item(
            &mut rls_conn,
            &user.0,
            tenant.0,
            id,
            payload.low_stock_threshold,
            payload.sale_price,
        )
        .await?;
    Ok(Json(item))
}
