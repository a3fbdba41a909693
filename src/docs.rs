// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Achats / Ventes ---
        handlers::operations::list_achats,
        handlers::operations::create_achat,
        handlers::operations::update_achat,
        handlers::operations::delete_achat,
        handlers::operations::list_ventes,
        handlers::operations::create_vente,
        handlers::operations::update_vente,
        handlers::operations::delete_vente,

        // --- Stock ---
        handlers::stock::list_stock,
        handlers::stock::get_stock_item,
        handlers::stock::configure_stock_item,

        // --- Documents / Paiements ---
        handlers::documents::get_document,
        handlers::documents::print_document,
        handlers::payments::list_payments,
        handlers::payments::add_payment,
        handlers::payments::delete_payment,

        // --- Parametres / Invitations ---
        handlers::settings::create_societe,
        handlers::invitations::redeem_invitation,
        handlers::settings::get_societe,
        handlers::settings::update_societe,
        handlers::settings::regenerate_invite_code,
        handlers::invitations::list_invitations,
        handlers::invitations::create_invitation,

        // --- Utilisateurs ---
        handlers::users::list_users,
        handlers::users::change_role,
        handlers::users::set_locked,
        handlers::users::remove_user,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::NewSocietePayload,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ChangeRolePayload,
            models::auth::SetLockedPayload,

            // --- Tenancy ---
            models::tenancy::Societe,
            models::tenancy::Invitation,
            models::tenancy::InvitationStatus,
            models::tenancy::InvitationPayload,
            models::tenancy::RedeemPayload,

            // --- Operations ---
            models::operations::DocumentKind,
            models::operations::Document,
            models::operations::DocumentLine,
            models::operations::DocumentDetail,
            models::operations::DocumentPayload,
            models::operations::DocumentLinePayload,

            // --- Stock ---
            models::stock::StockItem,
            models::stock::StockLot,
            models::stock::ConfigureStockPayload,
            handlers::stock::StockItemDetail,

            // --- Finance ---
            models::finance::PaymentStatus,
            models::finance::PaymentMode,
            models::finance::Payment,
            models::finance::PaymentPayload,

            // --- Dashboard ---
            services::dashboard_service::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, registro e convites de entrada"),
        (name = "Dashboard", description = "Indicadores do dia"),
        (name = "Achats", description = "Compras a fornecedor"),
        (name = "Ventes", description = "Vendas a cliente"),
        (name = "Stock", description = "Estoque e lotes"),
        (name = "Documents", description = "Detalhe e impressão de documentos"),
        (name = "Paiements", description = "Pagamentos e status de quitação"),
        (name = "Parametres", description = "Dados da farmácia e código de adesão"),
        (name = "Invitations", description = "Convites direcionados (apenas o dono)"),
        (name = "Utilisateurs", description = "Gerência da equipe (apenas o dono)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
