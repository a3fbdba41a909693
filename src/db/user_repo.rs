// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    /// Busca pelo e-mail (login e checagem de duplicidade no registro).
    /// Roda na pool principal: acontece ANTES de existir sessão/tenant.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Busca pelo ID (resolução da sessão a partir do `sub` do token).
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_by_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE tenant_id = $1 AND is_deleted = FALSE
             ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        role: Role,
        tenant_id: Option<Uuid>,
        is_owner: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role, tenant_id, is_owner)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(tenant_id)
        .bind(is_owner)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Vincula um usuário "aguardando convite" a uma société, com o papel
    /// definido pelo convite resgatado.
    pub async fn attach_to_tenant<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        tenant_id: Uuid,
        role: Role,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET tenant_id = $2, role = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    /// Usuário "aguardando convite" que cria a própria farmácia: vira dono
    /// e farmacêutico de uma vez.
    pub async fn promote_to_owner<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET tenant_id = $2, role = $3, is_owner = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(Role::Pharmacien)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $3, updated_at = NOW()
            WHERE id = $2 AND tenant_id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    pub async fn set_locked<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        locked: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_locked = $3, updated_at = NOW()
            WHERE id = $2 AND tenant_id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(locked)
        .fetch_optional(executor)
        .await?;
        user.ok_or(AppError::UserNotFound)
    }

    /// Soft delete: o registro permanece (auditoria de `created_by` nos
    /// documentos), mas a conta deixa de existir para o resto do sistema.
    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = TRUE, is_active = FALSE, updated_at = NOW()
            WHERE id = $2 AND tenant_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
