// src/services/tenancy_service.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::{Connection, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenancyRepository, UserRepository},
    models::auth::{CurrentUser, NewSocietePayload, Role, User},
    models::tenancy::{Invitation, InvitationStatus, Societe},
    services::policy,
};

const CODE_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_ATTEMPTS: usize = 10;
const INVITATION_TTL_DAYS: i64 = 7;

/// Sorteia um código de 6 alfanuméricos (mesmo formato para o código de
/// adesão da société e para convites direcionados).
fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Sorteia até 10 códigos, consultando a colisão a cada tentativa. Depois
/// disso desiste com erro explícito em vez de tentar para sempre.
async fn pick_code<F>(mut in_use: F) -> Result<String, AppError>
where
    F: AsyncFnMut(String) -> Result<bool, AppError>,
{
    for _ in 0..CODE_ATTEMPTS {
        let code = random_code();
        if !in_use(code.clone()).await? {
            return Ok(code);
        }
    }
    Err(AppError::InviteCodeExhausted)
}

/// Regras de resgate de um convite, puras sobre o registro carregado:
/// pendente, dentro da validade e (se direcionado) com o e-mail certo.
pub fn validate_invitation(
    invitation: &Invitation,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if invitation.status != InvitationStatus::Pending {
        return Err(AppError::InvitationUsed);
    }
    if invitation.expires_at <= now {
        return Err(AppError::InvitationExpired);
    }
    if let Some(bound_email) = &invitation.email {
        if !bound_email.eq_ignore_ascii_case(email) {
            return Err(AppError::InvitationEmailMismatch);
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct TenancyService {
    tenancy_repo: TenancyRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl TenancyService {
    pub fn new(tenancy_repo: TenancyRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { tenancy_repo, user_repo, pool }
    }

    pub async fn pick_unique_code(&self) -> Result<String, AppError> {
        let repo = self.tenancy_repo.clone();
        pick_code(async move |code: String| repo.code_in_use(&code).await).await
    }

    // ---
    // Entrada de quem já tem conta ("aguardando convite")
    // ---
    // Rodam na pool principal: o usuário ainda não tem société, então não
    // existe contexto RLS para estas escritas.

    /// Resgata um código (convite direcionado ou código de adesão) para uma
    /// conta existente ainda sem farmácia.
    pub async fn redeem_code(
        &self,
        current: &CurrentUser,
        code: &str,
    ) -> Result<User, AppError> {
        if current.tenant_id.is_some() {
            return Err(AppError::AlreadyAttached);
        }

        let mut tx = self.pool.begin().await?;

        let user = if let Some(invitation) =
            self.tenancy_repo.find_invitation_by_code(code).await?
        {
            validate_invitation(&invitation, &current.user.email, Utc::now())?;

            let user = self
                .user_repo
                .attach_to_tenant(&mut *tx, current.user.id, invitation.tenant_id, invitation.role)
                .await?;
            self.tenancy_repo
                .mark_invitation_used(&mut *tx, invitation.id)
                .await?;
            user
        } else if let Some(societe) = self.tenancy_repo.find_by_invite_code(code).await? {
            self.user_repo
                .attach_to_tenant(&mut *tx, current.user.id, societe.id, Role::Vendeur)
                .await?
        } else {
            return Err(AppError::InvitationInvalid);
        };

        tx.commit().await?;
        Ok(user)
    }

    /// Conta existente sem farmácia cria a própria: vira dona e farmacêutica.
    pub async fn create_societe_for(
        &self,
        current: &CurrentUser,
        payload: &NewSocietePayload,
    ) -> Result<Societe, AppError> {
        if current.tenant_id.is_some() {
            return Err(AppError::AlreadyAttached);
        }

        let code = self.pick_unique_code().await?;

        let mut tx = self.pool.begin().await?;
        let societe = self
            .tenancy_repo
            .create_societe(
                &mut *tx,
                &payload.name,
                payload.address.as_deref(),
                payload.phone.as_deref(),
                payload.email.as_deref(),
                current.user.id,
                &code,
            )
            .await?;
        self.user_repo
            .promote_to_owner(&mut *tx, current.user.id, societe.id)
            .await?;
        tx.commit().await?;

        Ok(societe)
    }

    // ---
    // Parâmetros da société
    // ---

    pub async fn get_societe(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Societe, AppError> {
        self.tenancy_repo
            .find_by_id(&mut *conn, tenant_id)
            .await?
            .ok_or(AppError::NotFound("Farmácia"))
    }

    pub async fn update_societe(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        payload: &NewSocietePayload,
    ) -> Result<Societe, AppError> {
        // Re-checagem na fronteira de dados (o extractor já barrou antes)
        policy::require(current, "parametres:write")?;

        self.tenancy_repo
            .update_societe(
                &mut *conn,
                tenant_id,
                &payload.name,
                payload.address.as_deref(),
                payload.phone.as_deref(),
                payload.email.as_deref(),
            )
            .await
    }

    /// Troca o código de adesão da société. O código antigo deixa de
    /// funcionar no mesmo instante.
    pub async fn regenerate_invite_code(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
    ) -> Result<Societe, AppError> {
        policy::ensure_can_manage_users(current)?;

        let code = self.pick_unique_code().await?;
        self.tenancy_repo
            .set_invite_code(&mut *conn, tenant_id, &code)
            .await
    }

    // ---
    // Convites direcionados
    // ---

    pub async fn create_invitation(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        role: Role,
        email: Option<&str>,
    ) -> Result<Invitation, AppError> {
        policy::ensure_can_manage_users(current)?;

        let code = self.pick_unique_code().await?;
        let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);

        let mut tx = conn.begin().await?;
        let invitation = self
            .tenancy_repo
            .create_invitation(&mut *tx, tenant_id, &code, role, email, expires_at)
            .await?;
        tx.commit().await?;

        Ok(invitation)
    }

    pub async fn list_invitations(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
    ) -> Result<Vec<Invitation>, AppError> {
        policy::ensure_can_manage_users(current)?;
        self.tenancy_repo.list_invitations(&mut *conn, tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(status: InvitationStatus, email: Option<&str>, ttl_hours: i64) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            code: "Q7B4M1".into(),
            role: Role::Vendeur,
            email: email.map(str::to_string),
            status,
            expires_at: Utc::now() + Duration::hours(ttl_hours),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn codigo_tem_6_alfanumericos_maiusculos() {
        for _ in 0..50 {
            let code = random_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn sorteio_desiste_apos_10_colisoes() {
        let mut tentativas = 0u32;
        let result = pick_code(async |_code| {
            tentativas += 1;
            Ok(true)
        })
        .await;
        assert!(matches!(result, Err(AppError::InviteCodeExhausted)));
        assert_eq!(tentativas, 10);
    }

    #[tokio::test]
    async fn sorteio_retorna_o_primeiro_codigo_livre() {
        let mut tentativas = 0u32;
        let code = pick_code(async |_code| {
            tentativas += 1;
            Ok(tentativas < 3)
        })
        .await
        .unwrap();
        assert_eq!(code.len(), 6);
        assert_eq!(tentativas, 3);
    }

    #[test]
    fn convite_pendente_e_valido_e_aceito() {
        let inv = invitation(InvitationStatus::Pending, None, 24);
        assert!(validate_invitation(&inv, "qualquer@pharma.test", Utc::now()).is_ok());
    }

    #[test]
    fn convite_usado_e_recusado() {
        let inv = invitation(InvitationStatus::Used, None, 24);
        assert!(matches!(
            validate_invitation(&inv, "a@pharma.test", Utc::now()),
            Err(AppError::InvitationUsed)
        ));
    }

    #[test]
    fn convite_expirado_e_recusado() {
        let inv = invitation(InvitationStatus::Pending, None, -1);
        assert!(matches!(
            validate_invitation(&inv, "a@pharma.test", Utc::now()),
            Err(AppError::InvitationExpired)
        ));
    }

    #[test]
    fn convite_direcionado_exige_o_mesmo_email() {
        let inv = invitation(InvitationStatus::Pending, Some("alvo@pharma.test"), 24);
        assert!(validate_invitation(&inv, "ALVO@pharma.test", Utc::now()).is_ok());
        assert!(matches!(
            validate_invitation(&inv, "outro@pharma.test", Utc::now()),
            Err(AppError::InvitationEmailMismatch)
        ));
    }
}
