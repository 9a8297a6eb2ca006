//! Store implementations: catalog (file, remote) and ledger (SeaORM, memory)

pub mod catalog_repository;
pub mod ledger_repository;
pub mod memory_ledger_repository;
pub mod remote_catalog_repository;

pub use catalog_repository::CsvCatalogStore;
pub use ledger_repository::SeaOrmLedgerStore;
pub use memory_ledger_repository::InMemoryLedgerStore;
pub use remote_catalog_repository::RemoteCatalogStore;
