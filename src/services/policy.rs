// src/services/policy.rs

// ---
// O módulo de autorização
// ---
// TODAS as regras de permissão moram aqui, como funções puras sobre a
// identidade resolvida (papel + flag de dono). Nada aqui toca banco ou
// rede: handlers chamam via extractor (middleware/rbac.rs) e as services
// re-chamam na fronteira de dados. O esconder de botões no front-end é
// cortesia de UX, nunca segurança.

use crate::{
    common::error::AppError,
    models::auth::{CurrentUser, Role, User},
};

// Permissões por papel. Gerência de usuários NÃO aparece aqui de
// propósito: nenhum papel a concede, só a flag de dono (ver abaixo).
const PHARMACIEN_PERMS: &[&str] = &[
    "achats:read",
    "achats:write",
    "ventes:read",
    "ventes:write",
    "stock:read",
    "stock:write",
    "factures:read",
    "paiements:read",
    "paiements:write",
    "parametres:read",
    "parametres:write",
    "tableau:read",
];

const VENDEUR_PERMS: &[&str] = &[
    "ventes:read",
    "ventes:write",
    "stock:read",
    "factures:read",
    "paiements:read",
    "paiements:write",
    "tableau:read",
];

pub fn role_permissions(role: Role) -> &'static [&'static str] {
    match role {
        Role::Pharmacien => PHARMACIEN_PERMS,
        Role::Vendeur => VENDEUR_PERMS,
    }
}

/// O dono tem todas as permissões operacionais, qualquer que seja o papel.
pub fn allowed(role: Role, is_owner: bool, permission: &str) -> bool {
    is_owner || role_permissions(role).contains(&permission)
}

pub fn require(current: &CurrentUser, permission: &'static str) -> Result<(), AppError> {
    if allowed(current.role, current.is_owner, permission) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(permission.to_string()))
    }
}

// ---
// Gerência de usuários
// ---

/// Verdadeiro se e somente se a flag de dono está ligada.
pub fn can_manage_users(current: &CurrentUser) -> bool {
    current.is_owner
}

pub fn ensure_can_manage_users(current: &CurrentUser) -> Result<(), AppError> {
    if can_manage_users(current) {
        Ok(())
    } else {
        Err(AppError::OwnerOnly)
    }
}

/// Um usuário-alvo só pode ser alterado (papel, bloqueio, exclusão) se:
/// o autor é o dono, o alvo NÃO é o dono, e o alvo não é o próprio autor.
pub fn ensure_target_modifiable(current: &CurrentUser, target: &User) -> Result<(), AppError> {
    ensure_can_manage_users(current)?;
    if target.is_owner {
        return Err(AppError::OwnerImmutable);
    }
    if target.id == current.user.id {
        return Err(AppError::SelfModification);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role, is_owner: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "x@pharma.test".into(),
            password_hash: "hash".into(),
            role,
            tenant_id: Some(Uuid::new_v4()),
            is_owner,
            is_active: true,
            is_locked: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn current(role: Role, is_owner: bool) -> CurrentUser {
        CurrentUser::from_user(user(role, is_owner))
    }

    #[test]
    fn pharmacien_acessa_compras_vendeur_nao() {
        assert!(allowed(Role::Pharmacien, false, "achats:write"));
        assert!(!allowed(Role::Vendeur, false, "achats:write"));
        assert!(!allowed(Role::Vendeur, false, "achats:read"));
    }

    #[test]
    fn vendeur_acessa_vendas_e_leitura_de_estoque() {
        assert!(allowed(Role::Vendeur, false, "ventes:write"));
        assert!(allowed(Role::Vendeur, false, "stock:read"));
        assert!(!allowed(Role::Vendeur, false, "stock:write"));
    }

    #[test]
    fn dono_tem_todas_as_permissoes_mesmo_como_vendeur() {
        assert!(allowed(Role::Vendeur, true, "achats:write"));
        assert!(allowed(Role::Vendeur, true, "parametres:write"));
    }

    #[test]
    fn gerencia_de_usuarios_depende_so_da_flag_de_dono() {
        // Papel de farmacêutico NÃO basta
        assert!(!can_manage_users(&current(Role::Pharmacien, false)));
        assert!(can_manage_users(&current(Role::Pharmacien, true)));
        assert!(can_manage_users(&current(Role::Vendeur, true)));
    }

    #[test]
    fn nao_dono_recebe_negacao_explicita() {
        let actor = current(Role::Pharmacien, false);
        let target = user(Role::Vendeur, false);
        assert!(matches!(
            ensure_target_modifiable(&actor, &target),
            Err(AppError::OwnerOnly)
        ));
    }

    #[test]
    fn dono_nao_pode_ser_alterado() {
        let actor = current(Role::Pharmacien, true);
        let target = user(Role::Pharmacien, true);
        assert!(matches!(
            ensure_target_modifiable(&actor, &target),
            Err(AppError::OwnerImmutable)
        ));
    }

    #[test]
    fn dono_nao_altera_a_si_mesmo() {
        let actor = current(Role::Pharmacien, true);
        let mut target = user(Role::Vendeur, false);
        target.id = actor.user.id;
        assert!(matches!(
            ensure_target_modifiable(&actor, &target),
            Err(AppError::SelfModification)
        ));
    }

    #[test]
    fn dono_altera_funcionario_comum() {
        let actor = current(Role::Pharmacien, true);
        let target = user(Role::Vendeur, false);
        assert!(ensure_target_modifiable(&actor, &target).is_ok());
    }
}
