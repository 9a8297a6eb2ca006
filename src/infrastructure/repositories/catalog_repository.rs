//! File-backed CatalogStore (CSV on local disk)

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::{CatalogStore, DomainError};
use crate::models::BookRecord;
use crate::modules::import::parse_catalog_csv;
use crate::utils::CodeNormalizer;

pub struct CsvCatalogStore {
    path: PathBuf,
    normalizer: CodeNormalizer,
}

impl CsvCatalogStore {
    pub fn new(path: impl Into<PathBuf>, normalizer: CodeNormalizer) -> Self {
        Self {
            path: path.into(),
            normalizer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for CsvCatalogStore {
    async fn load(&self) -> Result<Vec<BookRecord>, DomainError> {
        let content = tokio::fs::read(&self.path).await.map_err(|e| {
            DomainError::External(format!("Cannot read {}: {}", self.path.display(), e))
        })?;
        parse_catalog_csv(&content, &self.normalizer).map_err(DomainError::Validation)
    }

    async fn replace(&self, content: &[u8]) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write beside the target, then rename, so readers never see half a file
        let staging = self.path.with_extension("csv.upload");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
