//! Library Service - reads the stores into snapshots and runs the mutations
//!
//! Every read goes through [`LibraryService::refresh`], which returns an
//! immutable snapshot; availability is then computed over that snapshot.
//! Mutations re-read the ledger right before writing and re-check their
//! precondition. That narrows the race with other sessions writing the same
//! ledger but does not close it: the ledger offers no lock.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::{CatalogStore, DomainError, LedgerStore, Session};
use crate::models::{BookRecord, LedgerColumn, LedgerRow, LoanStatus};
use crate::modules::import::parse_catalog_csv;
use crate::services::availability_service::{
    AvailabilityEngine, AvailabilityReport, DATE_FORMAT, LoanError, ReturnError,
    SourceUnavailable,
};
use crate::services::search_service::{self, SearchResponse};
use crate::utils::CodeNormalizer;

const CATALOG_SOURCE: &str = "catalog";
const LEDGER_SOURCE: &str = "ledger";

fn unavailable(source: &str, e: DomainError) -> SourceUnavailable {
    SourceUnavailable {
        source: source.to_string(),
        reason: e.to_string(),
    }
}

/// Catalog and ledger as read at one instant
#[derive(Debug, Clone)]
pub struct LibrarySnapshot {
    pub catalog: Vec<BookRecord>,
    pub ledger: Vec<LedgerRow>,
    /// Sources that failed to load; their side of the snapshot is empty
    pub degraded: Vec<SourceUnavailable>,
    pub taken_at: DateTime<Utc>,
}

impl LibrarySnapshot {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Availability of the whole catalog, as served to readers
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityOverview {
    #[serde(flatten)]
    pub report: AvailabilityReport,
    pub degraded: Vec<SourceUnavailable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Unauthorized,
    Invalid(String),
    SourceUnavailable(SourceUnavailable),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Unauthorized => write!(f, "Admin session required"),
            CatalogError::Invalid(msg) => write!(f, "Invalid catalog: {}", msg),
            CatalogError::SourceUnavailable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Clone)]
pub struct LibraryService {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn LedgerStore>,
    engine: AvailabilityEngine,
}

impl LibraryService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn LedgerStore>,
        normalizer: CodeNormalizer,
    ) -> Self {
        Self {
            catalog,
            ledger,
            engine: AvailabilityEngine::new(normalizer),
        }
    }

    pub fn engine(&self) -> &AvailabilityEngine {
        &self.engine
    }

    pub fn catalog_store(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn ledger_store(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    async fn load_catalog(&self) -> Result<Vec<BookRecord>, SourceUnavailable> {
        self.catalog.load().await.map_err(|e| {
            tracing::warn!("Catalog {} unavailable: {}", self.catalog.describe(), e);
            unavailable(CATALOG_SOURCE, e)
        })
    }

    async fn load_ledger(&self) -> Result<Vec<LedgerRow>, SourceUnavailable> {
        self.ledger.list_rows().await.map_err(|e| {
            tracing::warn!("Loan ledger unavailable: {}", e);
            unavailable(LEDGER_SOURCE, e)
        })
    }

    /// Read both stores. Never fails: an unreadable source contributes no
    /// data and is listed in `degraded`.
    pub async fn refresh(&self) -> LibrarySnapshot {
        let mut degraded = Vec::new();

        let catalog = self.load_catalog().await.unwrap_or_else(|e| {
            degraded.push(e);
            Vec::new()
        });
        let ledger = self.load_ledger().await.unwrap_or_else(|e| {
            degraded.push(e);
            Vec::new()
        });

        tracing::debug!(
            "Snapshot: {} catalog entries, {} ledger rows",
            catalog.len(),
            ledger.len()
        );

        LibrarySnapshot {
            catalog,
            ledger,
            degraded,
            taken_at: Utc::now(),
        }
    }

    pub fn compute(&self, snapshot: &LibrarySnapshot) -> AvailabilityReport {
        let report = self
            .engine
            .compute_availability(&snapshot.catalog, snapshot.ledger.iter().map(|r| &r.event));
        for warning in &report.warnings {
            tracing::warn!("Ledger integrity: {}", warning);
        }
        report
    }

    pub async fn availability(&self) -> AvailabilityOverview {
        let snapshot = self.refresh().await;
        AvailabilityOverview {
            report: self.compute(&snapshot),
            degraded: snapshot.degraded,
        }
    }

    pub async fn search(&self, query: &str) -> SearchResponse {
        let snapshot = self.refresh().await;
        let report = self.compute(&snapshot);
        search_service::search(&self.engine, &snapshot.catalog, &report, query)
    }

    /// Ledger rows in append order, optionally only the open ones
    pub async fn ledger_rows(&self, open_only: bool) -> Result<Vec<LedgerRow>, SourceUnavailable> {
        let rows = self.load_ledger().await?;
        Ok(rows
            .into_iter()
            .filter(|r| !open_only || r.event.is_open())
            .collect())
    }

    /// Append a new open loan if a copy is free.
    pub async fn record_loan(
        &self,
        session: &Session,
        code: &str,
        borrower: &str,
        date: NaiveDate,
    ) -> Result<LedgerRow, LoanError> {
        if !session.is_active(Utc::now()) {
            return Err(LoanError::Unauthorized);
        }

        let catalog = self
            .load_catalog()
            .await
            .map_err(LoanError::SourceUnavailable)?;
        let rows = self
            .load_ledger()
            .await
            .map_err(LoanError::SourceUnavailable)?;

        let event = self.engine.check_loan(
            &catalog,
            rows.iter().map(|r| &r.event),
            code,
            borrower,
            date,
        )?;

        let appended = self.ledger.append_row(&event).await.map_err(|e| {
            tracing::error!("Failed to append loan of '{}': {}", event.book_code, e);
            LoanError::SourceUnavailable(unavailable(LEDGER_SOURCE, e))
        })?;

        tracing::info!(
            "Loan recorded: '{}' to {} on {} (row {})",
            appended.event.book_code,
            appended.event.borrower,
            appended.event.loan_date,
            appended.row
        );
        Ok(appended)
    }

    /// Open loans the caller may choose from when recording a return
    pub async fn return_candidates(
        &self,
        code: &str,
        borrower: Option<&str>,
    ) -> Result<Vec<LedgerRow>, ReturnError> {
        let rows = self
            .load_ledger()
            .await
            .map_err(ReturnError::SourceUnavailable)?;
        Ok(self.engine.open_candidates(&rows, code, borrower))
    }

    /// Close the loan at `row`, which must still be an open candidate for
    /// `code` (and `borrower`, if given). Stamped with today's date.
    /// Once the return date is written the loan counts as closed, even if the
    /// status cell could not be updated.
    pub async fn record_return(
        &self,
        session: &Session,
        code: &str,
        borrower: Option<&str>,
        row: u32,
    ) -> Result<LedgerRow, ReturnError> {
        self.record_return_on(session, code, borrower, row, Local::now().date_naive())
            .await
    }

    pub async fn record_return_on(
        &self,
        session: &Session,
        code: &str,
        borrower: Option<&str>,
        row: u32,
        today: NaiveDate,
    ) -> Result<LedgerRow, ReturnError> {
        if !session.is_active(Utc::now()) {
            return Err(ReturnError::Unauthorized);
        }

        let rows = self
            .load_ledger()
            .await
            .map_err(ReturnError::SourceUnavailable)?;
        let mut selected = self.engine.select_return(&rows, code, borrower, row)?;

        let return_date = today.format(DATE_FORMAT).to_string();
        self.ledger
            .update_cell(row, LedgerColumn::ReturnDate, &return_date)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record return on row {}: {}", row, e);
                ReturnError::SourceUnavailable(unavailable(LEDGER_SOURCE, e))
            })?;

        // The return date closes the loan. A stale status cell only shows up
        // as a StatusMismatch warning on later reads.
        match self
            .ledger
            .update_cell(row, LedgerColumn::Status, LoanStatus::Closed.label())
            .await
        {
            Ok(()) => selected.event.close(return_date),
            Err(e) => {
                tracing::warn!("Return on row {} recorded without status update: {}", row, e);
                selected.event.return_date = Some(return_date);
            }
        }

        tracing::info!(
            "Return recorded: '{}' from {} (row {})",
            selected.event.book_code,
            selected.event.borrower,
            row
        );
        Ok(selected)
    }

    /// Validate an uploaded catalog and overwrite the stored one with it.
    /// Returns the number of entries in the new catalog.
    pub async fn replace_catalog(
        &self,
        session: &Session,
        content: &[u8],
    ) -> Result<usize, CatalogError> {
        if !session.is_active(Utc::now()) {
            return Err(CatalogError::Unauthorized);
        }

        let books =
            parse_catalog_csv(content, self.engine.normalizer()).map_err(CatalogError::Invalid)?;

        self.catalog.replace(content).await.map_err(|e| match e {
            DomainError::Validation(msg) => CatalogError::Invalid(msg),
            other => CatalogError::SourceUnavailable(unavailable(CATALOG_SOURCE, other)),
        })?;

        tracing::info!(
            "Catalog {} replaced with {} entries",
            self.catalog.describe(),
            books.len()
        );
        Ok(books.len())
    }
}
