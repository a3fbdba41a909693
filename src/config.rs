// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        FinanceRepository, OperationsRepository, StockRepository, TenancyRepository,
        UserRepository,
    },
    services::{
        auth_service::AuthService, dashboard_service::DashboardService,
        document_service::DocumentService, finance_service::FinanceService,
        operation_service::OperationService, stock_service::StockService,
        tenancy_service::TenancyService, user_service::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub user_service: UserService,
    pub stock_service: StockService,
    pub operation_service: OperationService,
    pub finance_service: FinanceService,
    pub document_service: DocumentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        // A identidade RLS ('app.tenant_id'/'app.user_id') é definida por
        // requisição (ver common/db_utils.rs) com escopo de sessão; ao
        // devolver a conexão à pool ela é limpa, para que uma conexão usada
        // por um tenant nunca volte "suja" para os fluxos pré-sessão
        // (registro, login, resgate de convite).
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .after_release(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query(
                        "SELECT set_config('app.tenant_id', '', false),
                                set_config('app.user_id', '', false)",
                    )
                    .execute(&mut *conn)
                    .await?;
                    Ok(true)
                })
            })
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenancy_repo = TenancyRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new();
        let operations_repo = OperationsRepository::new();
        let finance_repo = FinanceRepository::new();

        let tenancy_service =
            TenancyService::new(tenancy_repo.clone(), user_repo.clone(), db_pool.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            tenancy_repo.clone(),
            tenancy_service.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo.clone());
        let stock_service = StockService::new(stock_repo.clone());
        let operation_service = OperationService::new(
            operations_repo.clone(),
            finance_repo.clone(),
            stock_service.clone(),
        );
        let finance_service =
            FinanceService::new(finance_repo.clone(), operations_repo.clone());
        let document_service = DocumentService::new(
            operations_repo.clone(),
            finance_repo.clone(),
            tenancy_repo.clone(),
        );
        let dashboard_service =
            DashboardService::new(operations_repo.clone(), stock_repo.clone());

        Ok(Self {
            db_pool,
            auth_service,
            tenancy_service,
            user_service,
            stock_service,
            operation_service,
            finance_service,
            document_service,
            dashboard_service,
        })
    }
}
