// src/models/stock.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Estoque "tradicional": um registro agregado por produto.
// A quantidade deveria acompanhar a soma dos lotes; as duas escritas
// acontecem na mesma transação (ver operation_service).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Paracétamol 500mg")]
    pub product_name: String,

    #[schema(example = "15.0")]
    pub quantity: Decimal,

    // Sobrescritos a cada compra com os valores mais recentes
    #[schema(example = "2.50")]
    pub purchase_price: Decimal,
    pub sale_price: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date, example = "2027-06-30")]
    pub expiry_date: Option<NaiveDate>,

    // Limiar de reposição (padrão: 5 na criação via compra)
    #[schema(example = "5.0")]
    pub low_stock_threshold: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Ajustes manuais permitidos no item (a quantidade só muda via documentos)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureStockPayload {
    #[validate(custom(function = crate::models::operations::validate_not_negative))]
    pub low_stock_threshold: Option<Decimal>,
    #[validate(custom(function = crate::models::operations::validate_not_negative))]
    pub sale_price: Option<Decimal>,
}

// Entrada multi-lote: um lote específico (número, fornecedor, validade),
// distinto da quantidade agregada do produto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLot {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,

    #[schema(example = "LOT-2026-014")]
    pub lot_number: String,
    pub supplier: Option<String>,
    pub quantity: Decimal,
    #[schema(value_type = Option<String>, format = Date, example = "2027-06-30")]
    pub expiry_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}
