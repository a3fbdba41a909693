// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenancyRepository, UserRepository},
    models::auth::{Claims, RegisterUserPayload, Role, User},
    services::tenancy_service::{validate_invitation, TenancyService},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenancy_repo: TenancyRepository,
    tenancy_service: TenancyService,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenancy_repo: TenancyRepository,
        tenancy_service: TenancyService,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, tenancy_repo, tenancy_service, jwt_secret, pool }
    }

    /// Registro com três destinos possíveis:
    /// 1. `societe` preenchido  -> cria uma farmácia nova, usuário vira dono;
    /// 2. `invite_code`         -> resgata um convite direcionado OU o código
    ///                             de adesão de uma société existente;
    /// 3. nenhum dos dois       -> conta fica "aguardando convite".
    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        // 1. Hashing (fora da transação: não toca no banco e é pesado)
        let password = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // O código novo é sorteado antes do BEGIN; a constraint UNIQUE cobre
        // a janela entre a checagem e o INSERT.
        let societe_code = if payload.societe.is_some() {
            Some(self.tenancy_service.pick_unique_code().await?)
        } else {
            None
        };

        // --- INÍCIO DA TRANSAÇÃO ---
        // Usuário, société e consumo de convite: ou tudo, ou nada.
        let mut tx = self.pool.begin().await?;

        let user = if let (Some(societe), Some(code)) = (&payload.societe, &societe_code) {
            // 2a. Farmácia nova: o criador é dono E farmacêutico
            let owner = self
                .user_repo
                .create_user(&mut *tx, &payload.email, &hashed_password, Role::Pharmacien, None, true)
                .await?;

            let societe = self
                .tenancy_repo
                .create_societe(
                    &mut *tx,
                    &societe.name,
                    societe.address.as_deref(),
                    societe.phone.as_deref(),
                    societe.email.as_deref(),
                    owner.id,
                    code,
                )
                .await?;

            self.user_repo
                .attach_to_tenant(&mut *tx, owner.id, societe.id, Role::Pharmacien)
                .await?
        } else if let Some(code) = payload.invite_code.as_deref() {
            // 2b. Convite direcionado tem prioridade sobre o código de adesão
            if let Some(invitation) = self.tenancy_repo.find_invitation_by_code(code).await? {
                validate_invitation(&invitation, &payload.email, Utc::now())?;

                let user = self
                    .user_repo
                    .create_user(
                        &mut *tx,
                        &payload.email,
                        &hashed_password,
                        invitation.role,
                        Some(invitation.tenant_id),
                        false,
                    )
                    .await?;

                // Consumido exatamente uma vez, na mesma transação
                self.tenancy_repo
                    .mark_invitation_used(&mut *tx, invitation.id)
                    .await?;
                user
            } else if let Some(societe) = self.tenancy_repo.find_by_invite_code(code).await? {
                // Código de adesão permanente: entra como vendeur
                self.user_repo
                    .create_user(
                        &mut *tx,
                        &payload.email,
                        &hashed_password,
                        Role::Vendeur,
                        Some(societe.id),
                        false,
                    )
                    .await?
            } else {
                return Err(AppError::InvitationInvalid);
            }
        } else {
            // 2c. Sem société e sem convite: conta válida, aguardando convite
            self.user_repo
                .create_user(&mut *tx, &payload.email, &hashed_password, Role::Vendeur, None, false)
                .await?
        };

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        self.create_token(user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Conta bloqueada/excluída não loga, mesmo com a senha certa
        if !user.is_active || user.is_locked || user.is_deleted {
            return Err(AppError::AccountInaccessible);
        }

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
