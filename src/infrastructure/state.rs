//! Application state containing the library service and the admin gate

use chrono::Duration;
use std::sync::Arc;

use crate::infrastructure::auth::{hash_password, AdminGate};
use crate::infrastructure::config::Config;
use crate::infrastructure::db;
use crate::domain::CatalogStore;
use crate::infrastructure::{CsvCatalogStore, RemoteCatalogStore, SeaOrmLedgerStore};
use crate::services::LibraryService;
use crate::utils::CodeNormalizer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub library: LibraryService,
    pub gate: Arc<AdminGate>,
}

impl AppState {
    pub fn new(library: LibraryService, gate: AdminGate) -> Self {
        Self {
            library,
            gate: Arc::new(gate),
        }
    }

    /// Wire stores and credentials from configuration
    pub async fn from_config(config: &Config) -> Result<Self, String> {
        let normalizer = CodeNormalizer::new(config.strip_accents);

        let catalog: Arc<dyn CatalogStore> = match &config.catalog_url {
            Some(url) => Arc::new(RemoteCatalogStore::new(url, normalizer).map_err(|e| e.to_string())?),
            None => Arc::new(CsvCatalogStore::new(&config.catalog_path, normalizer)),
        };
        tracing::info!("Catalog source: {}", catalog.describe());

        let conn = db::init_db(&config.database_url)
            .await
            .map_err(|e| format!("Failed to initialize ledger database: {}", e))?;
        let ledger = Arc::new(SeaOrmLedgerStore::new(conn));

        let password_hash = match (&config.admin_password_hash, &config.admin_password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hash_password(password)?,
            (None, None) if config.seed_demo => {
                tracing::warn!("No admin password configured, demo mode uses 'admin'");
                hash_password("admin")?
            }
            (None, None) => {
                return Err("ADMIN_PASSWORD or ADMIN_PASSWORD_HASH must be set".to_string());
            }
        };
        let jwt_secret = config
            .jwt_secret
            .clone()
            .ok_or("JWT_SECRET environment variable must be set in production")?;

        let gate = AdminGate::new(
            config.admin_username.clone(),
            password_hash,
            jwt_secret,
            Duration::minutes(config.session_minutes),
        );

        Ok(Self::new(
            LibraryService::new(catalog, ledger, normalizer),
            gate,
        ))
    }
}
