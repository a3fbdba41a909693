pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod invitations;
pub mod operations;
pub mod payments;
pub mod settings;
pub mod stock;
pub mod users;
