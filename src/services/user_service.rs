// src/services/user_service.rs

use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CurrentUser, Role, User},
    services::policy,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list_team(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
    ) -> Result<Vec<User>, AppError> {
        policy::ensure_can_manage_users(current)?;
        self.user_repo.list_by_tenant(&mut *conn, tenant_id).await
    }

    /// Carrega o alvo e re-aplica as três regras de gerência (dono-somente,
    /// dono-imutável, nunca-a-si-mesmo) antes de QUALQUER escrita.
    async fn load_target(
        &self,
        current: &CurrentUser,
        tenant_id: Uuid,
        target_id: Uuid,
    ) -> Result<User, AppError> {
        let target = self
            .user_repo
            .find_by_id(target_id)
            .await?
            .filter(|u| u.tenant_id == Some(tenant_id) && !u.is_deleted)
            .ok_or(AppError::UserNotFound)?;

        policy::ensure_target_modifiable(current, &target)?;
        Ok(target)
    }

    pub async fn change_role(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        target_id: Uuid,
        role: Role,
    ) -> Result<User, AppError> {
        let target = self.load_target(current, tenant_id, target_id).await?;

        let mut tx = conn.begin().await?;
        let updated = self
            .user_repo
            .update_role(&mut *tx, tenant_id, target.id, role)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_locked(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        target_id: Uuid,
        locked: bool,
    ) -> Result<User, AppError> {
        let target = self.load_target(current, tenant_id, target_id).await?;

        let mut tx = conn.begin().await?;
        let updated = self
            .user_repo
            .set_locked(&mut *tx, tenant_id, target.id, locked)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn remove(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        target_id: Uuid,
    ) -> Result<(), AppError> {
        let target = self.load_target(current, tenant_id, target_id).await?;

        let mut tx = conn.begin().await?;
        self.user_repo
            .soft_delete(&mut *tx, tenant_id, target.id)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
