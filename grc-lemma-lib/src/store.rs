//! Read-only interfaces to the lemma map and the dictionary.
//!
//! The resolver only ever calls these two traits. Implementations decide how
//! the data is held (in memory, SQLite, a remote service) and report backend
//! failures as [`LemmaError::StoreUnavailable`](crate::errors::LemmaError).

use std::sync::Arc;

use crate::errors::Result;
use crate::types::{DictionaryEntry, LemmaMapping};

/// Word form → lemma mappings.
pub trait LemmaStore {
    /// All mappings for a normalized word form, highest confidence first.
    /// An unknown word form yields an empty list.
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>>;
}

/// Headword → dictionary entry lookups.
pub trait DictionaryStore {
    /// The entry for a normalized headword in a language, if any.
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>>;

    /// Entries whose normalized headword matches a LIKE pattern (`%` matches
    /// any run of characters, `_` exactly one, `\` escapes the next
    /// character), at most `limit` of them.
    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>>;
}

/// Escape LIKE wildcards so `text` matches only itself.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl<T: LemmaStore + ?Sized> LemmaStore for &T {
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>> {
        (**self).lemma_mappings(normalized)
    }
}

impl<T: LemmaStore + ?Sized> LemmaStore for Box<T> {
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>> {
        (**self).lemma_mappings(normalized)
    }
}

impl<T: LemmaStore + ?Sized> LemmaStore for Arc<T> {
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>> {
        (**self).lemma_mappings(normalized)
    }
}

impl<T: DictionaryStore + ?Sized> DictionaryStore for &T {
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>> {
        (**self).entry(normalized_headword, language)
    }

    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>> {
        (**self).search(pattern, language, limit)
    }
}

impl<T: DictionaryStore + ?Sized> DictionaryStore for Box<T> {
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>> {
        (**self).entry(normalized_headword, language)
    }

    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>> {
        (**self).search(pattern, language, limit)
    }
}

impl<T: DictionaryStore + ?Sized> DictionaryStore for Arc<T> {
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>> {
        (**self).entry(normalized_headword, language)
    }

    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>> {
        (**self).search(pattern, language, limit)
    }
}
