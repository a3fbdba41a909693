use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Taxonomia: (a) credenciais, (b) autorização, (c) validação, (d) I/O remoto.
// Nada aqui é fatal para o processo: toda falha fica restrita à ação atual.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Conta desativada, bloqueada ou excluída (soft delete)
    #[error("Conta inacessível")]
    AccountInaccessible,

    // Usuário autenticado mas ainda sem société (aguardando convite)
    #[error("Usuário sem farmácia vinculada")]
    NoTenant,

    // Negação de autorização: sempre mensagem explícita, nunca no-op silencioso
    #[error("Permissão negada: {0}")]
    PermissionDenied(String),

    #[error("Apenas o dono da farmácia pode gerenciar usuários")]
    OwnerOnly,

    #[error("O dono da farmácia não pode ser alterado")]
    OwnerImmutable,

    #[error("Você não pode alterar o seu próprio usuário por aqui")]
    SelfModification,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Resgate de convite por quem já tem société
    #[error("Você já faz parte de uma farmácia")]
    AlreadyAttached,

    #[error("Convite inválido")]
    InvitationInvalid,

    #[error("Convite expirado")]
    InvitationExpired,

    #[error("Convite já utilizado")]
    InvitationUsed,

    #[error("Este convite está vinculado a outro e-mail")]
    InvitationEmailMismatch,

    #[error("Estoque insuficiente para '{0}'")]
    InsufficientStock(String),

    #[error("O pagamento ultrapassa o saldo do documento")]
    PaymentExceedsBalance,

    // O gerador de códigos tenta 10 vezes antes de desistir explicitamente
    #[error("Não foi possível gerar um código de convite único")]
    InviteCodeExhausted,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::AccountInaccessible => (
                StatusCode::FORBIDDEN,
                "Esta conta está desativada, bloqueada ou excluída.".to_string(),
            ),
            AppError::NoTenant => (
                StatusCode::FORBIDDEN,
                "Você ainda não faz parte de uma farmácia. Use um código de convite.".to_string(),
            ),
            AppError::PermissionDenied(ref perm) => (
                StatusCode::FORBIDDEN,
                format!("Você precisa da permissão '{}' para realizar esta ação.", perm),
            ),
            ref e @ (AppError::OwnerOnly
            | AppError::OwnerImmutable
            | AppError::SelfModification) => (StatusCode::FORBIDDEN, e.to_string()),
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", what))
            }
            ref e @ (AppError::InvitationInvalid
            | AppError::InvitationExpired
            | AppError::InvitationUsed
            | AppError::InvitationEmailMismatch) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ref e @ AppError::InsufficientStock(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ref e @ AppError::PaymentExceedsBalance => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ref e @ (AppError::UniqueConstraintViolation(_) | AppError::AlreadyAttached) => {
                (StatusCode::CONFLICT, e.to_string())
            }

            // Todos os outros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe o genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
