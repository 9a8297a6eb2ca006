use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Loan ledger: one row per loan, never deleted. The id doubles as the
    // sheet row number minus one (row 1 is the header).
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS loan_ledger (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_code TEXT NOT NULL,
            borrower TEXT NOT NULL,
            loan_date TEXT NOT NULL,
            return_date TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'Emprestado'
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Migration: ledgers created before the status column existed
    // If it exists, this fails, so we ignore errors (simple migration strategy)
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE loan_ledger ADD COLUMN status TEXT NOT NULL DEFAULT 'Emprestado'"
                .to_owned(),
        ))
        .await;

    Ok(())
}
