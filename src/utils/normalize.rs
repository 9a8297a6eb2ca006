//! Code and text folding shared by the catalog, the ledger and search.
//!
//! Catalog codes and ledger codes must go through the same normalizer, or
//! open-loan counts land in a bucket no catalog entry reads from. The
//! accent toggle is therefore fixed when the normalizer is built (from
//! `Config`) and never chosen per call.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A book code after trimming, case folding and (optionally) accent stripping.
///
/// Only [`CodeNormalizer::normalize`] builds one, so two codes compare equal
/// exactly when they resolve to the same availability bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedCode(String);

impl NormalizedCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeNormalizer {
    strip_accents: bool,
}

impl Default for CodeNormalizer {
    fn default() -> Self {
        Self {
            strip_accents: true,
        }
    }
}

impl CodeNormalizer {
    pub fn new(strip_accents: bool) -> Self {
        Self { strip_accents }
    }

    pub fn strips_accents(&self) -> bool {
        self.strip_accents
    }

    pub fn normalize(&self, code: &str) -> NormalizedCode {
        NormalizedCode(self.fold_text(code))
    }

    /// Same folding as [`normalize`](Self::normalize), for free text
    /// (titles, authors, queries).
    pub fn fold_text(&self, text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        if self.strip_accents {
            strip_accents(&lowered)
        } else {
            lowered
        }
    }
}

/// Decompose (NFD) and drop combining marks: "Código" -> "Codigo".
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_share_a_bucket() {
        let n = CodeNormalizer::default();
        assert_eq!(n.normalize("B1"), n.normalize(" b1 "));
        assert_eq!(n.normalize("b1"), n.normalize("\tB1\n"));
    }

    #[test]
    fn test_accents_stripped_when_enabled() {
        let n = CodeNormalizer::new(true);
        assert_eq!(n.normalize("Ação-01").as_str(), "acao-01");
        assert_eq!(n.fold_text("  Título do Livro "), "titulo do livro");
    }

    #[test]
    fn test_accents_kept_when_disabled() {
        let n = CodeNormalizer::new(false);
        assert_eq!(n.normalize("AÇÃO-01").as_str(), "ação-01");
        assert_ne!(n.normalize("ação"), n.normalize("acao"));
    }

    #[test]
    fn test_blank_code_is_empty() {
        let n = CodeNormalizer::default();
        assert!(n.normalize("   ").is_empty());
    }
}
