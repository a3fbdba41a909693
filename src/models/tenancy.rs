// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::Role;

// ---
// 1. Société (A "Farmácia")
// ---
// A conta principal: todos os dados do sistema pertencem a exatamente uma.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Societe {
    pub id: Uuid,
    #[schema(example = "Pharmacie du Centre")]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: Uuid,

    // Código de adesão permanente (6 alfanuméricos), regenerável pelo dono.
    // Funciona como um convite "em pé" no papel de vendeur.
    #[schema(example = "A3X9K2")]
    pub invite_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload de resgate de código por uma conta já existente
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RedeemPayload {
    #[validate(length(min = 6, max = 6, message = "O código tem 6 caracteres."))]
    pub code: String,
}

// Payload de criação de convite direcionado
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPayload {
    pub role: Role,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

// ---
// 2. Convite direcionado
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Used,
}

// Criado pelo dono; consumido exatamente uma vez no registro.
// Imutável depois de usado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Q7B4M1")]
    pub code: String,
    pub role: Role,
    // Se preenchido, só este e-mail pode resgatar o convite
    pub email: Option<String>,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
