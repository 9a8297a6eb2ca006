use crate::domain::{CatalogStore, DomainError, LedgerStore};
use crate::models::LoanEvent;

const DEMO_CATALOG: &str = "\
codigo,Título do Livro,Autor,quantidade
L-001,Dom Casmurro,Machado de Assis,2
L-002,Memórias Póstumas de Brás Cubas,Machado de Assis,1
L-003,Capitães da Areia,Jorge Amado,3
L-004,O Cortiço,Aluísio Azevedo,1
L-005,Vidas Secas,Graciliano Ramos,2
";

/// Write a demo catalog when none can be read, and a couple of open loans
/// when the ledger is empty. Existing data is never touched.
pub async fn seed_demo_data(
    catalog: &dyn CatalogStore,
    ledger: &dyn LedgerStore,
) -> Result<(), DomainError> {
    match catalog.load().await {
        Ok(books) if !books.is_empty() => {
            tracing::info!("Catalog already has {} entries, not seeding", books.len());
        }
        _ => {
            catalog.replace(DEMO_CATALOG.as_bytes()).await?;
            tracing::info!("Demo catalog written to {}", catalog.describe());
        }
    }

    if ledger.list_rows().await?.is_empty() {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        for (code, borrower) in [("L-001", "Maria Silva"), ("L-002", "João Souza")] {
            ledger
                .append_row(&LoanEvent::open(code, borrower, today.clone()))
                .await?;
        }
        tracing::info!("Demo loans appended to ledger");
    }

    Ok(())
}
