//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only trait definitions, the session value and domain error types.

pub mod errors;
pub mod repositories;
pub mod session;

pub use errors::DomainError;
pub use repositories::*;
pub use session::Session;
