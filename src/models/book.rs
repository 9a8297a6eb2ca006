use serde::{Deserialize, Serialize};

/// One catalog entry. Loaded wholesale from the catalog store and never
/// mutated during a session; an admin upload replaces the whole list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Code as written in the catalog. Matching always goes through
    /// `CodeNormalizer`, never through this raw value.
    pub code: String,
    pub title: String,
    pub author: String,
    pub total_copies: u32,
}

impl BookRecord {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        total_copies: u32,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            author: author.into(),
            total_copies,
        }
    }
}
