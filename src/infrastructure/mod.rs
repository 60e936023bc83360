//! Infrastructure layer
//!
//! SeaORM wiring and process start-up: connection and schema (db), env
//! configuration (config), the generic repository and its shop and webhook
//! instances (repositories), shared handler state (state) and the router
//! with its middleware stack (server).

pub mod config;
pub mod db;
pub mod repositories;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
