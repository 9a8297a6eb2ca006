//! Availability Service - copy accounting over a catalog and a loan ledger
//!
//! Everything here is a pure function of its inputs. Stores are read by
//! `library_service`, which hands the resulting snapshot to this engine.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::{BookRecord, LedgerRow, LoanEvent};
use crate::utils::{CodeNormalizer, NormalizedCode};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Copies of one catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// `total - open_loans`, floored at zero
    pub available: u32,
    pub total: u32,
    pub open_loans: u32,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        self.available > 0
    }
}

/// Ledger content that disagrees with the catalog or with itself.
/// Surfaced to callers, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// Open loans recorded for a code the catalog does not know
    UnknownCode { code: NormalizedCode, open_loans: u32 },
    /// More open loans than copies
    Overdrawn {
        code: NormalizedCode,
        total: u32,
        open_loans: u32,
    },
    /// Status cell contradicts the return date cell
    StatusMismatch {
        code: NormalizedCode,
        borrower: String,
        status: String,
    },
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIntegrityWarning::UnknownCode { code, open_loans } => write!(
                f,
                "Ledger code '{}' is not in the catalog ({} open loan(s))",
                code, open_loans
            ),
            DataIntegrityWarning::Overdrawn {
                code,
                total,
                open_loans,
            } => write!(
                f,
                "Code '{}' has {} open loan(s) but only {} copies",
                code, open_loans, total
            ),
            DataIntegrityWarning::StatusMismatch {
                code,
                borrower,
                status,
            } => write!(
                f,
                "Loan of '{}' to {} has status '{}' contradicting its return date",
                code, borrower, status
            ),
        }
    }
}

/// A collaborator that could not be read. The snapshot degrades to no data
/// for that side instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnavailable {
    pub source: String,
    pub reason: String,
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unavailable: {}", self.source, self.reason)
    }
}

impl std::error::Error for SourceUnavailable {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    /// Admin session missing or expired
    Unauthorized,
    UnknownBook(String),
    MissingBorrower,
    NoCopiesAvailable(String),
    SourceUnavailable(SourceUnavailable),
}

impl fmt::Display for LoanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanError::Unauthorized => write!(f, "Admin session required"),
            LoanError::UnknownBook(code) => write!(f, "Book '{}' is not in the catalog", code),
            LoanError::MissingBorrower => write!(f, "Borrower name is required"),
            LoanError::NoCopiesAvailable(code) => {
                write!(f, "No copies of '{}' are available", code)
            }
            LoanError::SourceUnavailable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoanError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnError {
    /// Admin session missing or expired
    Unauthorized,
    NoOpenLoan(String),
    /// The selected row is not an open loan matching the request
    InvalidSelection { row: u32, candidates: Vec<u32> },
    SourceUnavailable(SourceUnavailable),
}

impl fmt::Display for ReturnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnError::Unauthorized => write!(f, "Admin session required"),
            ReturnError::NoOpenLoan(code) => write!(f, "No open loan found for '{}'", code),
            ReturnError::InvalidSelection { row, candidates } => write!(
                f,
                "Row {} is not an open loan for this book (candidates: {:?})",
                row, candidates
            ),
            ReturnError::SourceUnavailable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ReturnError {}

/// Result of [`AvailabilityEngine::compute_availability`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    /// One entry per catalog code, including codes with no loans
    pub by_code: HashMap<NormalizedCode, Availability>,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl AvailabilityReport {
    pub fn get(&self, code: &NormalizedCode) -> Option<Availability> {
        self.by_code.get(code).copied()
    }
}

/// Availability accounting. Holds the one normalizer every comparison uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityEngine {
    normalizer: CodeNormalizer,
}

impl AvailabilityEngine {
    pub fn new(normalizer: CodeNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &CodeNormalizer {
        &self.normalizer
    }

    pub fn normalize(&self, code: &str) -> NormalizedCode {
        self.normalizer.normalize(code)
    }

    fn same_borrower(&self, a: &str, b: &str) -> bool {
        self.normalizer.fold_text(a) == self.normalizer.fold_text(b)
    }

    /// Open loans per normalized code
    pub fn open_counts<'a>(
        &self,
        ledger: impl IntoIterator<Item = &'a LoanEvent>,
    ) -> HashMap<NormalizedCode, u32> {
        let mut counts = HashMap::new();
        for event in ledger.into_iter().filter(|e| e.is_open()) {
            *counts.entry(self.normalize(&event.book_code)).or_insert(0) += 1;
        }
        counts
    }

    pub fn compute_availability<'a>(
        &self,
        catalog: &[BookRecord],
        ledger: impl IntoIterator<Item = &'a LoanEvent>,
    ) -> AvailabilityReport {
        let mut warnings = Vec::new();
        let mut open_counts = HashMap::new();
        let mut ledger_codes = HashSet::new();

        for event in ledger {
            ledger_codes.insert(self.normalize(&event.book_code));
            if event.status_mismatch() {
                warnings.push(DataIntegrityWarning::StatusMismatch {
                    code: self.normalize(&event.book_code),
                    borrower: event.borrower.clone(),
                    status: event.status.clone(),
                });
            }
            if event.is_open() {
                *open_counts
                    .entry(self.normalize(&event.book_code))
                    .or_insert(0u32) += 1;
            }
        }

        let mut by_code = HashMap::with_capacity(catalog.len());
        for book in catalog {
            let code = self.normalize(&book.code);
            if by_code.contains_key(&code) {
                continue;
            }
            let open_loans = open_counts.get(&code).copied().unwrap_or(0);
            if open_loans > book.total_copies {
                warnings.push(DataIntegrityWarning::Overdrawn {
                    code: code.clone(),
                    total: book.total_copies,
                    open_loans,
                });
            }
            by_code.insert(
                code,
                Availability {
                    available: book.total_copies.saturating_sub(open_loans),
                    total: book.total_copies,
                    open_loans,
                },
            );
        }

        // Closed rows count too
        let mut unknown: Vec<_> = ledger_codes
            .into_iter()
            .filter(|code| !by_code.contains_key(code))
            .map(|code| {
                let open_loans = open_counts.get(&code).copied().unwrap_or(0);
                (code, open_loans)
            })
            .collect();
        unknown.sort();
        warnings.extend(
            unknown
                .into_iter()
                .map(|(code, open_loans)| DataIntegrityWarning::UnknownCode { code, open_loans }),
        );

        AvailabilityReport { by_code, warnings }
    }

    /// Validate a loan request and build the event to append.
    /// Nothing is written here.
    pub fn check_loan<'a>(
        &self,
        catalog: &[BookRecord],
        ledger: impl IntoIterator<Item = &'a LoanEvent>,
        code: &str,
        borrower: &str,
        date: NaiveDate,
    ) -> Result<LoanEvent, LoanError> {
        let key = self.normalize(code);
        let book = catalog
            .iter()
            .find(|b| self.normalize(&b.code) == key)
            .ok_or_else(|| LoanError::UnknownBook(code.trim().to_string()))?;

        let borrower = borrower.trim();
        if borrower.is_empty() {
            return Err(LoanError::MissingBorrower);
        }

        let open_loans = self.open_counts(ledger).get(&key).copied().unwrap_or(0);
        if book.total_copies.saturating_sub(open_loans) == 0 {
            return Err(LoanError::NoCopiesAvailable(book.code.clone()));
        }

        Ok(LoanEvent::open(
            book.code.trim(),
            borrower,
            date.format(DATE_FORMAT).to_string(),
        ))
    }

    /// Open loans for `code`, optionally narrowed to one borrower, in ledger
    /// order. Callers pick one of these by row; there is no implicit choice.
    pub fn open_candidates(
        &self,
        rows: &[LedgerRow],
        code: &str,
        borrower: Option<&str>,
    ) -> Vec<LedgerRow> {
        let key = self.normalize(code);
        let borrower = borrower.map(str::trim).filter(|b| !b.is_empty());
        rows.iter()
            .filter(|r| r.event.is_open())
            .filter(|r| self.normalize(&r.event.book_code) == key)
            .filter(|r| borrower.is_none_or(|b| self.same_borrower(&r.event.borrower, b)))
            .cloned()
            .collect()
    }

    /// Resolve an explicit row selection against the current candidates.
    pub fn select_return(
        &self,
        rows: &[LedgerRow],
        code: &str,
        borrower: Option<&str>,
        row: u32,
    ) -> Result<LedgerRow, ReturnError> {
        let candidates = self.open_candidates(rows, code, borrower);
        if candidates.is_empty() {
            return Err(ReturnError::NoOpenLoan(code.trim().to_string()));
        }
        match candidates.iter().find(|c| c.row == row) {
            Some(selected) => Ok(selected.clone()),
            None => Err(ReturnError::InvalidSelection {
                row,
                candidates: candidates.iter().map(|c| c.row).collect(),
            }),
        }
    }
}
