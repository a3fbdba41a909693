// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;
use crate::middleware::tenancy::tenant_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é aceitável aqui: sem configuração, a aplicação não sobe.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_public_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Só exigem token; usuário "aguardando convite" também alcança. É por
    // aqui que ele entra numa farmácia (resgate) ou cria a sua própria.
    let onboarding_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route(
            "/invitations/redeem",
            post(handlers::invitations::redeem_invitation),
        )
        .route("/societes", post(handlers::settings::create_societe))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Todo o resto exige token E vínculo com uma société. As duas camadas
    // rodam de fora para dentro: auth_guard primeiro, tenant_guard depois.
    let tenant_routes = Router::new()
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route(
            "/achats",
            get(handlers::operations::list_achats).post(handlers::operations::create_achat),
        )
        .route(
            "/achats/{id}",
            put(handlers::operations::update_achat).delete(handlers::operations::delete_achat),
        )
        .route(
            "/ventes",
            get(handlers::operations::list_ventes).post(handlers::operations::create_vente),
        )
        .route(
            "/ventes/{id}",
            put(handlers::operations::update_vente).delete(handlers::operations::delete_vente),
        )
        .route("/stock", get(handlers::stock::list_stock))
        .route(
            "/stock/{id}",
            get(handlers::stock::get_stock_item).put(handlers::stock::configure_stock_item),
        )
        .route("/documents/{id}", get(handlers::documents::get_document))
        .route(
            "/documents/{id}/print",
            get(handlers::documents::print_document),
        )
        .route(
            "/documents/{id}/paiements",
            get(handlers::payments::list_payments).post(handlers::payments::add_payment),
        )
        .route(
            "/paiements/{id}",
            axum::routing::delete(handlers::payments::delete_payment),
        )
        .route(
            "/parametres/societe",
            get(handlers::settings::get_societe).put(handlers::settings::update_societe),
        )
        .route(
            "/parametres/societe/code",
            post(handlers::settings::regenerate_invite_code),
        )
        .route(
            "/invitations",
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        .route("/utilisateurs", get(handlers::users::list_users))
        .route(
            "/utilisateurs/{id}",
            axum::routing::delete(handlers::users::remove_user),
        )
        .route("/utilisateurs/{id}/role", put(handlers::users::change_role))
        .route("/utilisateurs/{id}/verrou", put(handlers::users::set_locked))
        .layer(axum_middleware::from_fn(tenant_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_public_routes)
        .nest("/api", onboarding_routes)
        .nest("/api", tenant_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
