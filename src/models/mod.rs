pub mod auth;
pub mod finance;
pub mod operations;
pub mod stock;
pub mod tenancy;
