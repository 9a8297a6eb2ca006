//! Store trait definitions
//!
//! These traits define the contract for the two external collaborators the
//! engine reads from: the catalog and the loan ledger.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{BookRecord, LedgerColumn, LedgerRow, LoanEvent};

/// Source of catalog records (local file or remote tabular export)
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load every catalog row. Rows without a code are already excluded.
    async fn load(&self) -> Result<Vec<BookRecord>, DomainError>;

    /// Overwrite the whole catalog with an uploaded file. Not merged.
    async fn replace(&self, content: &[u8]) -> Result<(), DomainError>;

    /// Short description for logs ("file catalogo.csv", "url ...")
    fn describe(&self) -> String;
}

/// Append-only loan ledger addressed by 1-based row (row 1 is the header)
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All data rows in append order
    async fn list_rows(&self) -> Result<Vec<LedgerRow>, DomainError>;

    /// Append an event and return it with the row it landed on
    async fn append_row(&self, event: &LoanEvent) -> Result<LedgerRow, DomainError>;

    /// Overwrite a single cell of an existing data row
    async fn update_cell(
        &self,
        row: u32,
        column: LedgerColumn,
        value: &str,
    ) -> Result<(), DomainError>;
}
