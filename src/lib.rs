//! Support library for HTTP microservices: an exception handler chain that
//! turns errors into responses, a generic SeaORM repository with validation
//! and error translation, and a webhook header guard.

pub mod api;
pub mod domain;
pub mod exceptions;
pub mod infrastructure;
pub mod middleware;
pub mod models;

pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::server;
