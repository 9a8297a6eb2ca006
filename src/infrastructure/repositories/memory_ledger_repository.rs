//! In-process LedgerStore, used for demos and tests

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::{DomainError, LedgerStore};
use crate::models::loan::FIRST_DATA_ROW;
use crate::models::{LedgerColumn, LedgerRow, LoanEvent};

#[derive(Default)]
pub struct InMemoryLedgerStore {
    events: Mutex<Vec<LoanEvent>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<LoanEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<LoanEvent>>, DomainError> {
        self.events
            .lock()
            .map_err(|_| DomainError::Internal("ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn list_rows(&self) -> Result<Vec<LedgerRow>, DomainError> {
        Ok(self
            .lock()?
            .iter()
            .enumerate()
            .map(|(i, event)| LedgerRow {
                row: i as u32 + FIRST_DATA_ROW,
                event: event.clone(),
            })
            .collect())
    }

    async fn append_row(&self, event: &LoanEvent) -> Result<LedgerRow, DomainError> {
        let mut events = self.lock()?;
        events.push(event.clone());
        Ok(LedgerRow {
            row: events.len() as u32 + FIRST_DATA_ROW - 1,
            event: event.clone(),
        })
    }

    async fn update_cell(
        &self,
        row: u32,
        column: LedgerColumn,
        value: &str,
    ) -> Result<(), DomainError> {
        if row < FIRST_DATA_ROW {
            return Err(DomainError::Validation(format!(
                "Row {} is not a data row",
                row
            )));
        }
        let mut events = self.lock()?;
        let event = events
            .get_mut((row - FIRST_DATA_ROW) as usize)
            .ok_or(DomainError::NotFound)?;

        let value = value.to_owned();
        match column {
            LedgerColumn::BookCode => event.book_code = value,
            LedgerColumn::Borrower => event.borrower = value,
            LedgerColumn::LoanDate => event.loan_date = value,
            LedgerColumn::ReturnDate => {
                event.return_date = Some(value).filter(|v| !v.trim().is_empty())
            }
            LedgerColumn::Status => event.status = value,
        }
        Ok(())
    }
}
