// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// Papel (função) do usuário dentro da farmácia.
// O dono é marcado à parte, via flag `is_owner` — papel não dá poder de
// gerenciar usuários; só a flag de dono dá.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pharmacien,
    Vendeur,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,

    // NULL = registrado mas "aguardando convite"; é um estado válido
    pub tenant_id: Option<Uuid>,
    pub is_owner: bool,
    pub is_active: bool,
    pub is_locked: bool,
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Identidade resolvida da sessão
// ---
// Montada UMA vez pelo middleware de autenticação a partir do registro do
// banco (nunca de headers do cliente) e injetada explicitamente em tudo
// que decide autorização.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub is_owner: bool,
}

impl CurrentUser {
    pub fn from_user(user: User) -> Self {
        Self {
            role: user.role,
            tenant_id: user.tenant_id,
            is_owner: user.is_owner,
            user,
        }
    }
}

// Dados da société informados no registro "nova farmácia"
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSocietePayload {
    #[validate(length(min = 1, message = "O nome da farmácia é obrigatório."))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// Dados para registro de um novo usuário.
// Três modos: criar uma farmácia nova, entrar com um código de convite,
// ou nenhum dos dois (fica "aguardando convite").
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(nested)]
    pub societe: Option<NewSocietePayload>,

    #[validate(length(min = 6, max = 6, message = "O código de convite tem 6 caracteres."))]
    pub invite_code: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Payloads da gerência de usuários (rotas do dono)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRolePayload {
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetLockedPayload {
    pub locked: bool,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
