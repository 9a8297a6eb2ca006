//! SeaORM implementation of LedgerStore

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::{DomainError, LedgerStore};
use crate::models::loan::{ActiveModel, Column, Entity as LedgerEntity, FIRST_DATA_ROW, Model};
use crate::models::{LedgerColumn, LedgerRow, LoanEvent};

fn to_row(model: Model) -> LedgerRow {
    LedgerRow {
        row: model.id as u32 + 1,
        event: model.into(),
    }
}

/// SeaORM-based implementation of LedgerStore
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for SeaOrmLedgerStore {
    async fn list_rows(&self) -> Result<Vec<LedgerRow>, DomainError> {
        let rows = LedgerEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(to_row).collect())
    }

    async fn append_row(&self, event: &LoanEvent) -> Result<LedgerRow, DomainError> {
        let row = ActiveModel {
            book_code: Set(event.book_code.clone()),
            borrower: Set(event.borrower.clone()),
            loan_date: Set(event.loan_date.clone()),
            return_date: Set(event.return_date.clone().unwrap_or_default()),
            status: Set(event.status.clone()),
            ..Default::default()
        };

        let result = row.insert(&self.db).await?;
        Ok(to_row(result))
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

        let model = LedgerEntity::find_by_id(row as i32 - 1)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = model.into();
        let value = value.to_owned();
        match column {
            LedgerColumn::BookCode => active.book_code = Set(value),
            LedgerColumn::Borrower => active.borrower = Set(value),
            LedgerColumn::LoanDate => active.loan_date = Set(value),
            LedgerColumn::ReturnDate => active.return_date = Set(value),
            LedgerColumn::Status => active.status = Set(value),
        }
        active.update(&self.db).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::init_db;

    async fn store() -> SeaOrmLedgerStore {
        let db = init_db("sqlite::memory:").await.expect("Failed to init db");
        SeaOrmLedgerStore::new(db)
    }

    #[tokio::test]
    async fn test_first_append_lands_on_row_two() {
        let store = store().await;
        let first = store
            .append_row(&LoanEvent::open("b1", "Ana", "2024-03-01"))
            .await
            .unwrap();
        let second = store
            .append_row(&LoanEvent::open("b2", "Bia", "2024-03-02"))
            .await
            .unwrap();

        assert_eq!(first.row, 2);
        assert_eq!(second.row, 3);

        let rows = store.list_rows().await.unwrap();
        assert_eq!(rows, vec![first, second]);
        assert!(rows[0].event.is_open());
    }

    #[tokio::test]
    async fn test_update_cell_closes_loan() {
        let store = store().await;
        let row = store
            .append_row(&LoanEvent::open("b1", "Ana", "2024-03-01"))
            .await
            .unwrap()
            .row;

        store
            .update_cell(row, LedgerColumn::ReturnDate, "2024-03-09")
            .await
            .unwrap();
        store
            .update_cell(row, LedgerColumn::Status, "Devolvido")
            .await
            .unwrap();

        let rows = store.list_rows().await.unwrap();
        assert_eq!(rows[0].event.return_date.as_deref(), Some("2024-03-09"));
        assert!(!rows[0].event.is_open());
        assert!(!rows[0].event.status_mismatch());
    }

    #[tokio::test]
    async fn test_update_cell_rejects_header_and_missing_rows() {
        let store = store().await;
        assert!(matches!(
            store.update_cell(1, LedgerColumn::Status, "x").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store.update_cell(40, LedgerColumn::Status, "x").await,
            Err(DomainError::NotFound)
        ));
    }
}
