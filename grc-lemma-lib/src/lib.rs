pub mod types;
pub mod errors;
pub mod normalize;
pub mod rules;
pub mod candidates;
pub mod store;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod resolver;
pub mod line;
pub mod output;

pub use candidates::{generate_lemma_candidates, CandidateGenerator, GeneratorOptions};
pub use errors::{LemmaError, Result};
pub use line::{resolve_line, word_forms};
pub use memory::{MemoryDictionary, MemoryLemmaStore};
pub use normalize::normalize;
pub use resolver::{LemmaResolver, ResolverConfig};
pub use rules::RuleTable;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use store::{escape_like, DictionaryStore, LemmaStore};
pub use types::{
    DictionaryEntry, LemmaCandidate, LemmaMapping, LineResolution, ResolutionResult,
    ResolvedEntry, WordForm,
};
