// src/db/tenancy_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::Role,
    models::tenancy::{Invitation, InvitationStatus, Societe},
};

#[derive(Clone)]
pub struct TenancyRepository {
    pool: PgPool,
}

impl TenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Société
    // ---

    pub async fn create_societe<'e, E>(
        &self,
        executor: E,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        owner_id: Uuid,
        invite_code: &str,
    ) -> Result<Societe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let societe = sqlx::query_as::<_, Societe>(
            r#"
            INSERT INTO societes (name, address, phone, email, owner_id, invite_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(phone)
        .bind(email)
        .bind(owner_id)
        .bind(invite_code)
        .fetch_one(executor)
        .await?;
        Ok(societe)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<Societe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let societe = sqlx::query_as::<_, Societe>("SELECT * FROM societes WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;
        Ok(societe)
    }

    /// Busca pelo código de adesão. Roda na pool principal: o registro de um
    /// novo usuário acontece antes de existir sessão (e portanto RLS).
    pub async fn find_by_invite_code(&self, code: &str) -> Result<Option<Societe>, AppError> {
        let societe = sqlx::query_as::<_, Societe>("SELECT * FROM societes WHERE invite_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(societe)
    }

    pub async fn update_societe<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Societe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let societe = sqlx::query_as::<_, Societe>(
            r#"
            UPDATE societes
            SET name = $2, address = $3, phone = $4, email = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(address)
        .bind(phone)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        societe.ok_or(AppError::NotFound("Farmácia"))
    }

    pub async fn set_invite_code<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Societe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let societe = sqlx::query_as::<_, Societe>(
            r#"
            UPDATE societes
            SET invite_code = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(code)
        .fetch_optional(executor)
        .await?;
        societe.ok_or(AppError::NotFound("Farmácia"))
    }

    /// Checa colisão para o gerador de códigos (société E convites: os dois
    /// espaços de código compartilham o mesmo formato de 6 caracteres).
    pub async fn code_in_use(&self, code: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM societes WHERE invite_code = $1
                UNION
                SELECT 1 FROM invitations WHERE code = $1
            )
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // ---
    // Convites direcionados
    // ---

    pub async fn create_invitation<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        code: &str,
        role: Role,
        email: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (tenant_id, code, role, email, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(code)
        .bind(role)
        .bind(email)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;
        Ok(invitation)
    }

    pub async fn list_invitations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Invitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitations = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(invitations)
    }

    /// Busca pelo código do convite (resgate no registro, pool principal).
    pub async fn find_invitation_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Invitation>, AppError> {
        let invitation =
            sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(invitation)
    }

    /// Marca o convite como usado. Exige status 'pending' na própria query:
    /// dois registros concorrentes com o mesmo código não consomem duas vezes.
    pub async fn mark_invitation_used<'e, E>(
        &self,
        executor: E,
        invitation_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE invitations SET status = $2 WHERE id = $1 AND status = $3",
        )
        .bind(invitation_id)
        .bind(InvitationStatus::Used)
        .bind(InvitationStatus::Pending)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvitationUsed);
        }
        Ok(())
    }
}
