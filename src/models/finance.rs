// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (valores gravados em francês, como nas telas) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum PaymentStatus {
    #[sqlx(rename = "impayé")]
    #[serde(rename = "impayé")]
    Impaye, // Nenhum pagamento
    #[sqlx(rename = "partiel")]
    #[serde(rename = "partiel")]
    Partiel, // 0 < pago < total
    #[sqlx(rename = "payé")]
    #[serde(rename = "payé")]
    Paye, // Pago >= total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum PaymentMode {
    #[sqlx(rename = "espèces")]
    #[serde(rename = "espèces")]
    Especes,
    #[sqlx(rename = "carte")]
    #[serde(rename = "carte")]
    Carte,
    #[sqlx(rename = "mobile")]
    #[serde(rename = "mobile")]
    Mobile,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Impaye => "impayé",
            PaymentStatus::Partiel => "partiel",
            PaymentStatus::Paye => "payé",
        }
    }
}

fn validate_positive(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(validator::ValidationError::new("not_positive")
            .with_message("O valor do pagamento deve ser maior que zero.".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[validate(custom(function = validate_positive))]
    pub amount: Decimal,
    pub mode: PaymentMode,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub document_id: Uuid,
    #[schema(example = "40.00")]
    pub amount: Decimal,
    pub mode: PaymentMode,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
