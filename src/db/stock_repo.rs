// src/db/stock_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{StockItem, StockLot},
};

// Sem estado próprio: todo método recebe o executor (pool, conexão RLS ou
// transação) de quem chama.
#[derive(Clone, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE tenant_id = $1 ORDER BY product_name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn find_item_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Busca com trava de linha (FOR UPDATE): as transições compra/venda
    /// leem-modificam-regravam a quantidade e precisam de exclusão mútua.
    pub async fn find_item_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_name: &str,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items
             WHERE tenant_id = $1 AND product_name = $2
             FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(product_name)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_lots<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        stock_item_id: Uuid,
    ) -> Result<Vec<StockLot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lots = sqlx::query_as::<_, StockLot>(
            "SELECT * FROM stock_lots
             WHERE tenant_id = $1 AND stock_item_id = $2
             ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .bind(stock_item_id)
        .fetch_all(executor)
        .await?;
        Ok(lots)
    }

    /// Contagem de produtos abaixo do limiar (cartão do dashboard).
    pub async fn count_below_threshold<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM stock_items
             WHERE tenant_id = $1 AND quantity <= low_stock_threshold",
        )
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_name: &str,
        quantity: Decimal,
        purchase_price: Decimal,
        sale_price: Option<Decimal>,
        expiry_date: Option<NaiveDate>,
        low_stock_threshold: Decimal,
    ) -> Result<StockItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items
                (tenant_id, product_name, quantity, purchase_price, sale_price,
                 expiry_date, low_stock_threshold)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_name)
        .bind(quantity)
        .bind(purchase_price)
        .bind(sale_price)
        .bind(expiry_date)
        .bind(low_stock_threshold)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(product_name.to_string());
                }
            }
            e.into()
        })
    }

    /// Regrava o estado completo do item (quantidade + últimos preços/validade).
    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        item: &StockItem,
    ) -> Result<StockItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET quantity = $3, purchase_price = $4, sale_price = $5,
                expiry_date = $6, low_stock_threshold = $7, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(item.tenant_id)
        .bind(item.id)
        .bind(item.quantity)
        .bind(item.purchase_price)
        .bind(item.sale_price)
        .bind(item.expiry_date)
        .bind(item.low_stock_threshold)
        .fetch_optional(executor)
        .await?;
        updated.ok_or(AppError::NotFound("Produto"))
    }

    pub async fn insert_lot<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        lot_number: &str,
        supplier: Option<&str>,
        quantity: Decimal,
        expiry_date: Option<NaiveDate>,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            INSERT INTO stock_lots
                (tenant_id, stock_item_id, lot_number, supplier, quantity, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(stock_item_id)
        .bind(lot_number)
        .bind(supplier)
        .bind(quantity)
        .bind(expiry_date)
        .fetch_one(executor)
        .await?;
        Ok(lot)
    }
}
