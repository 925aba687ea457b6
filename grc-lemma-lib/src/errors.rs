//! Error types for lemma resolution.
//!
//! An unknown word is never an error: it resolves to an empty
//! [`ResolutionResult`](crate::types::ResolutionResult). Errors only come from
//! the stores the resolver is built on, or from loading data files.

use std::error::Error;

/// Result type used throughout the crate.
pub type Result<T, E = LemmaError> = std::result::Result<T, E>;

/// Errors raised by the stores and loaders.
#[derive(Debug, thiserror::Error)]
pub enum LemmaError {
    /// A lemma or dictionary store could not be queried.
    ///
    /// Passed to the caller as-is. The resolver does not retry.
    #[error("{store} store unavailable: {source}")]
    StoreUnavailable {
        store: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// A rule table failed validation.
    #[error("invalid rule table: {0}")]
    InvalidRules(String),

    /// JSON data could not be parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A data file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LemmaError {
    /// Wrap a store backend error.
    pub fn store_unavailable<E>(store: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::StoreUnavailable {
            store,
            source: source.into(),
        }
    }

    /// Returns true if the error came from a store rather than local data.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
