pub mod finance_repo;
pub mod operations_repo;
pub mod stock_repo;
pub mod tenancy_repo;
pub mod user_repo;

pub use finance_repo::FinanceRepository;
pub use operations_repo::OperationsRepository;
pub use stock_repo::StockRepository;
pub use tenancy_repo::TenancyRepository;
pub use user_repo::UserRepository;
