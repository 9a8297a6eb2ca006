//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Ledger database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Admin gate (auth)
//! - Catalog and ledger store implementations (repositories)
//! - Demo data (seed)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
