//! Read-only CatalogStore fetched over HTTP
//!
//! Accepts any URL serving CSV. Google Sheets links copied from the browser
//! ("/edit#gid=...") are rewritten to their CSV export form.

use async_trait::async_trait;
use url::Url;

use crate::domain::{CatalogStore, DomainError};
use crate::models::BookRecord;
use crate::modules::import::parse_catalog_csv;
use crate::utils::CodeNormalizer;

const SHEETS_HOST: &str = "docs.google.com";

/// Rewrite a Google Sheets browser link into its CSV export URL.
/// Other URLs are returned unchanged.
pub fn export_url(url: &Url) -> Url {
    if url.host_str() != Some(SHEETS_HOST) {
        return url.clone();
    }
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    let ["spreadsheets", "d", id, rest @ ..] = segments.as_slice() else {
        return url.clone();
    };
    if rest.first() == Some(&"export") {
        return url.clone();
    }

    let gid = url
        .fragment()
        .and_then(|f| f.strip_prefix("gid="))
        .map(str::to_string)
        .or_else(|| {
            url.query_pairs()
                .find(|(k, _)| k == "gid")
                .map(|(_, v)| v.into_owned())
        })
        .filter(|g| !g.is_empty());

    let mut export = url.clone();
    export.set_path(&format!("/spreadsheets/d/{}/export", id));
    export.set_fragment(None);
    {
        let mut query = export.query_pairs_mut();
        query.clear().append_pair("format", "csv");
        if let Some(gid) = &gid {
            query.append_pair("gid", gid);
        }
    }
    export
}

pub struct RemoteCatalogStore {
    client: reqwest::Client,
    url: Url,
    normalizer: CodeNormalizer,
}

impl RemoteCatalogStore {
    pub fn new(url: &str, normalizer: CodeNormalizer) -> Result<Self, DomainError> {
        let parsed = Url::parse(url)
            .map_err(|e| DomainError::Validation(format!("Invalid catalog URL '{}': {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            url: export_url(&parsed),
            normalizer,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl CatalogStore for RemoteCatalogStore {
    async fn load(&self) -> Result<Vec<BookRecord>, DomainError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        parse_catalog_csv(&body, &self.normalizer).map_err(DomainError::Validation)
    }

    async fn replace(&self, _content: &[u8]) -> Result<(), DomainError> {
        Err(DomainError::Validation(format!(
            "Catalog at {} is read-only; upload to its source instead",
            self.url
        )))
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheets_edit_link_becomes_csv_export() {
        let url = Url::parse("https://docs.google.com/spreadsheets/d/abc123/edit?gid=0#gid=7").unwrap();
        assert_eq!(
            export_url(&url).as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=7"
        );
    }

    #[test]
    fn test_sheets_link_without_gid() {
        let url = Url::parse("https://docs.google.com/spreadsheets/d/abc123/edit").unwrap();
        assert_eq!(
            export_url(&url).as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn test_other_urls_untouched() {
        let url = Url::parse("https://raw.githubusercontent.com/org/repo/main/livros.csv").unwrap();
        assert_eq!(export_url(&url), url);
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            RemoteCatalogStore::new("not a url", CodeNormalizer::default()),
            Err(DomainError::Validation(_))
        ));
    }
}
