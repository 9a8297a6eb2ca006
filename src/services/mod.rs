//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Handlers and tests call into `LibraryService`; the availability engine
//! and search run over snapshots it produces.

pub mod availability_service;
pub mod library_service;
pub mod search_service;

// Re-export for convenience
pub use availability_service::{
    Availability, AvailabilityEngine, AvailabilityReport, DataIntegrityWarning, LoanError,
    ReturnError, SourceUnavailable,
};
pub use library_service::{AvailabilityOverview, CatalogError, LibraryService, LibrarySnapshot};
pub use search_service::{SearchHit, SearchResponse};
