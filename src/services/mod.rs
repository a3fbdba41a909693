pub mod auth_service;
pub mod dashboard_service;
pub mod document_service;
pub mod finance_service;
pub mod operation_service;
pub mod policy;
pub mod stock_service;
pub mod tenancy_service;
pub mod user_service;
