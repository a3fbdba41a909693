use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::tenancy::TenantContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define as variáveis RLS (a "chave").
/// Toda query feita nesta conexão fica limitada à société da sessão,
/// mesmo que alguma camada acima esqueça um filtro de tenant.
pub(crate) async fn get_rls_connection(
    app_state: &AppState,
    tenant_ctx: &TenantContext,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // 1. Adquire conexão
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // 2. Define Tenant ID (escopo de sessão: as services abrem as próprias
    // transações nesta conexão, então o valor precisa sobreviver ao BEGIN)
    sqlx::query("SELECT set_config('app.tenant_id', $1, false)")
        .bind(tenant_ctx.0.to_string())
        .execute(&mut *conn)
        .await?;

    // 3. Define User ID
    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.user.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
