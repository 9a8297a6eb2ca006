use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted ledger row. The spreadsheet-style row number handed to callers
/// is `id + 1`: row 1 is the header, so the first event is row 2.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_code: String,
    pub borrower: String,
    pub loan_date: String,
    #[sea_orm(default_value = "")]
    pub return_date: String, // empty while the loan is open
    pub status: String,      // 'Emprestado', 'Devolvido'
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle of a loan event: `Open --(return)--> Closed`. Closed is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "Emprestado")]
    Open,
    #[serde(rename = "Devolvido")]
    Closed,
}

impl LoanStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Open => "Emprestado",
            LoanStatus::Closed => "Devolvido",
        }
    }

    /// Accepts the ledger labels plus the English tags older sheets used.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "emprestado" | "open" | "active" | "loaned" => Some(LoanStatus::Open),
            "devolvido" | "closed" | "returned" => Some(LoanStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A loan as recorded in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanEvent {
    pub book_code: String,
    pub borrower: String,
    pub loan_date: String,
    /// `None` while open. Stores map blank cells to `None`.
    pub return_date: Option<String>,
    /// Status cell exactly as found in the ledger. Redundant with
    /// `return_date`, which wins when the two disagree.
    pub status: String,
}

impl LoanEvent {
    pub fn open(
        book_code: impl Into<String>,
        borrower: impl Into<String>,
        loan_date: impl Into<String>,
    ) -> Self {
        Self {
            book_code: book_code.into(),
            borrower: borrower.into(),
            loan_date: loan_date.into(),
            return_date: None,
            status: LoanStatus::Open.label().to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
    }

    pub fn state(&self) -> LoanStatus {
        if self.is_open() {
            LoanStatus::Open
        } else {
            LoanStatus::Closed
        }
    }

    /// The status cell parsed, if it holds a known label.
    pub fn recorded_status(&self) -> Option<LoanStatus> {
        LoanStatus::parse(&self.status)
    }

    /// True when the status cell names the other state than `return_date`
    /// implies. Blank or unknown status cells are not a mismatch.
    pub fn status_mismatch(&self) -> bool {
        self.recorded_status()
            .is_some_and(|recorded| recorded != self.state())
    }

    pub fn close(&mut self, return_date: impl Into<String>) {
        self.return_date = Some(return_date.into());
        self.status = LoanStatus::Closed.label().to_string();
    }
}

impl From<Model> for LoanEvent {
    fn from(model: Model) -> Self {
        let return_date = Some(model.return_date).filter(|d| !d.trim().is_empty());
        Self {
            book_code: model.book_code,
            borrower: model.borrower,
            loan_date: model.loan_date,
            return_date,
            status: model.status,
        }
    }
}

/// A ledger event together with its 1-based sheet row (row 1 is the header).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub row: u32,
    #[serde(flatten)]
    pub event: LoanEvent,
}

pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;

/// Ledger columns, numbered like the sheet (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerColumn {
    BookCode,
    Borrower,
    LoanDate,
    ReturnDate,
    Status,
}

impl LedgerColumn {
    pub const ALL: [LedgerColumn; 5] = [
        LedgerColumn::BookCode,
        LedgerColumn::Borrower,
        LedgerColumn::LoanDate,
        LedgerColumn::ReturnDate,
        LedgerColumn::Status,
    ];

    pub fn index(&self) -> u32 {
        match self {
            LedgerColumn::BookCode => 1,
            LedgerColumn::Borrower => 2,
            LedgerColumn::LoanDate => 3,
            LedgerColumn::ReturnDate => 4,
            LedgerColumn::Status => 5,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            LedgerColumn::BookCode => "Código",
            LedgerColumn::Borrower => "Nome",
            LedgerColumn::LoanDate => "Data do Empréstimo",
            LedgerColumn::ReturnDate => "Data da Devolução",
            LedgerColumn::Status => "Status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_event_is_open() {
        let event = LoanEvent::open("b1", "Ana", "2024-03-01");
        assert!(event.is_open());
        assert_eq!(event.state(), LoanStatus::Open);
        assert_eq!(event.status, "Emprestado");
        assert!(!event.status_mismatch());
    }

    #[test]
    fn test_close_sets_date_and_status_together() {
        let mut event = LoanEvent::open("b1", "Ana", "2024-03-01");
        event.close("2024-03-10");
        assert!(!event.is_open());
        assert_eq!(event.return_date.as_deref(), Some("2024-03-10"));
        assert_eq!(event.recorded_status(), Some(LoanStatus::Closed));
    }

    #[test]
    fn test_blank_return_date_counts_as_open() {
        let mut event = LoanEvent::open("b1", "Ana", "2024-03-01");
        event.return_date = Some("  ".to_string());
        assert!(event.is_open());
    }

    #[test]
    fn test_status_mismatch_detected() {
        let mut event = LoanEvent::open("b1", "Ana", "2024-03-01");
        event.status = "Devolvido".to_string();
        assert!(event.is_open());
        assert!(event.status_mismatch());

        event.status = String::new();
        assert!(!event.status_mismatch());
    }

    #[test]
    fn test_model_blank_return_date_maps_to_none() {
        let model = Model {
            id: 1,
            book_code: "b1".into(),
            borrower: "Ana".into(),
            loan_date: "2024-03-01".into(),
            return_date: "".into(),
            status: "Emprestado".into(),
        };
        let event: LoanEvent = model.into();
        assert_eq!(event.return_date, None);
    }

    #[test]
    fn test_column_indexes_follow_sheet_order() {
        let indexes: Vec<u32> = LedgerColumn::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
    }
}
