// src/services/dashboard_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgConnection;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OperationsRepository, StockRepository},
    models::operations::{document_total, DocumentKind},
};

/// Os três cartões da tela inicial.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(example = "128.50")]
    pub today_sales_total: Decimal,
    pub unpaid_sales_count: i64,
    pub low_stock_count: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    operations_repo: OperationsRepository,
    stock_repo: StockRepository,
}

impl DashboardService {
    pub fn new(operations_repo: OperationsRepository, stock_repo: StockRepository) -> Self {
        Self { operations_repo, stock_repo }
    }

    pub async fn summary(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<DashboardSummary, AppError> {
        // Total do dia reutiliza o MESMO cálculo das telas de documento,
        // em vez de uma segunda fórmula em SQL.
        let today = Utc::now().date_naive();
        let sales = self
            .operations_repo
            .list_documents_for_day(&mut *conn, tenant_id, DocumentKind::Vente, today)
            .await?;

        let mut today_sales_total = Decimal::ZERO;
        for sale in &sales {
            let lines = self
                .operations_repo
                .list_lines(&mut *conn, tenant_id, sale.id)
                .await?;
            today_sales_total += document_total(&lines, sale.global_discount);
        }

        let unpaid_sales_count = self
            .operations_repo
            .count_unpaid_sales(&mut *conn, tenant_id)
            .await?;
        let low_stock_count = self
            .stock_repo
            .count_below_threshold(&mut *conn, tenant_id)
            .await?;

        Ok(DashboardSummary { today_sales_total, unpaid_sales_count, low_stock_count })
    }
}
