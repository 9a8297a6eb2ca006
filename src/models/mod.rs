pub mod book;
pub mod loan;

pub use book::BookRecord;
pub use loan::{LedgerColumn, LedgerRow, LoanEvent, LoanStatus};
