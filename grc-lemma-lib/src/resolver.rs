// Lemma resolution: lemma map first, then generated candidates against the
// dictionary.

use std::borrow::Cow;
use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::{CandidateGenerator, GeneratorOptions};
use crate::errors::Result;
use crate::memory::by_confidence_desc;
use crate::normalize::{is_greek, lookup_key, normalize, normalize_language};
use crate::rules::RuleTable;
use crate::store::{escape_like, DictionaryStore, LemmaStore};
use crate::types::{
    CandidateRule, DictionaryEntry, LemmaCandidate, LemmaMapping, ResolutionResult, ResolvedEntry,
};

/// Language whose words get rule-based candidates.
pub const GREEK: &str = "greek";

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Language used when a caller passes an empty language tag.
    pub default_language: String,
    /// Maximum number of results from [`LemmaResolver::search`].
    pub search_limit: usize,
    /// How many candidate hits to return when no lemma mapping exists.
    pub candidate_hits: usize,
    pub generator: GeneratorOptions,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_language: GREEK.to_string(),
            search_limit: 10,
            candidate_hits: 1,
            generator: GeneratorOptions::default(),
        }
    }
}

/// Resolves inflected word forms to lemmas and dictionary entries.
///
/// Holds no mutable state; one resolver can serve any number of threads as
/// long as its stores can.
#[derive(Debug)]
pub struct LemmaResolver<L, D> {
    lemmas: L,
    dictionary: D,
    rules: Cow<'static, RuleTable>,
    config: ResolverConfig,
}

impl<L: LemmaStore, D: DictionaryStore> LemmaResolver<L, D> {
    pub fn new(lemmas: L, dictionary: D) -> Self {
        Self::with_config(lemmas, dictionary, ResolverConfig::default())
    }

    pub fn with_config(lemmas: L, dictionary: D, config: ResolverConfig) -> Self {
        Self {
            lemmas,
            dictionary,
            rules: Cow::Borrowed(RuleTable::embedded()),
            config,
        }
    }

    /// Replace the embedded Greek rule table.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Cow::Owned(rules);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn lemma_store(&self) -> &L {
        &self.lemmas
    }

    pub fn dictionary(&self) -> &D {
        &self.dictionary
    }

    fn language(&self, language: &str) -> String {
        let language = normalize_language(language);
        if language.is_empty() {
            normalize_language(&self.config.default_language)
        } else {
            language
        }
    }

    /// Lemma candidates for a word in lookup order. Ending rules apply only to
    /// Greek words; any other word (or language) yields just the word itself.
    pub fn candidates(&self, word: &str, language: &str) -> Vec<LemmaCandidate> {
        self.candidates_for(&lookup_key(word), &self.language(language))
    }

    fn candidates_for(&self, normalized: &str, language: &str) -> Vec<LemmaCandidate> {
        if normalized.is_empty() {
            return Vec::new();
        }
        if language == GREEK && is_greek(normalized) {
            CandidateGenerator::new(&self.rules)
                .with_options(self.config.generator)
                .generate(normalized)
        } else {
            vec![LemmaCandidate {
                text: normalized.to_string(),
                rule: CandidateRule::Identity,
                label: String::new(),
                rank: 0,
            }]
        }
    }

    /// Resolve a word form.
    ///
    /// Lemma mappings win when present: every mapped lemma is returned,
    /// confidence first, marked as a direct match. Otherwise generated
    /// candidates are looked up in order and the first hit (or first
    /// `candidate_hits` hits) is returned without a confidence. An unknown
    /// word yields an empty result; only store failures are errors.
    pub fn resolve(&self, word: &str, language: &str) -> Result<ResolutionResult> {
        let language = self.language(language);
        let normalized = lookup_key(word);
        let mut result = ResolutionResult::empty(word, &normalized, &language);
        if normalized.is_empty() {
            return Ok(result);
        }

        let mappings = self.lemmas.lemma_mappings(&normalized)?;
        if !mappings.is_empty() {
            debug!(word, normalized = %normalized, count = mappings.len(), "lemma mapping hit");
            for mapping in rank_mappings(mappings) {
                let entry = self
                    .dictionary
                    .entry(&normalize(&mapping.lemma), &language)?;
                result.entries.push(ResolvedEntry {
                    lemma: mapping.lemma,
                    entry,
                    confidence: mapping.confidence,
                    is_direct_match: true,
                    morph_info: mapping.morph_info,
                    source: mapping.source,
                    candidate: None,
                });
            }
            return Ok(result);
        }

        let wanted = self.config.candidate_hits.max(1);
        for candidate in self.candidates_for(&normalized, &language) {
            let Some(entry) = self.dictionary.entry(&candidate.text, &language)? else {
                continue;
            };
            debug!(
                word,
                candidate = %candidate.text,
                rule = ?candidate.rule,
                "candidate hit"
            );
            result.entries.push(ResolvedEntry {
                lemma: entry.headword.clone(),
                entry: Some(entry),
                confidence: None,
                is_direct_match: false,
                morph_info: None,
                source: None,
                candidate: Some(candidate),
            });
            if result.entries.len() >= wanted {
                break;
            }
        }

        if result.entries.is_empty() {
            debug!(word, normalized = %normalized, "no definition found");
        }
        Ok(result)
    }

    /// The single best lemma from the lemma map, if the word is mapped.
    pub fn lemma_for(&self, word: &str) -> Result<Option<String>> {
        let normalized = lookup_key(word);
        if normalized.is_empty() {
            return Ok(None);
        }
        let mappings = self.lemmas.lemma_mappings(&normalized)?;
        Ok(rank_mappings(mappings).into_iter().next().map(|m| m.lemma))
    }

    /// Dictionary entries whose headword starts with `prefix`. Wildcard
    /// characters in the prefix match only themselves.
    pub fn search(&self, prefix: &str, language: &str) -> Result<Vec<DictionaryEntry>> {
        let normalized = lookup_key(prefix);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("{}%", escape_like(&normalized));
        self.dictionary
            .search(&pattern, &self.language(language), self.config.search_limit)
    }
}

impl<L, D> LemmaResolver<L, D>
where
    L: LemmaStore + Sync,
    D: DictionaryStore + Sync,
{
    /// Resolve many words in parallel. Results keep input order; the first
    /// store error aborts the batch.
    pub fn resolve_batch<S: AsRef<str> + Sync>(
        &self,
        words: &[S],
        language: &str,
    ) -> Result<Vec<ResolutionResult>> {
        words
            .par_iter()
            .map(|w| self.resolve(w.as_ref(), language))
            .collect()
    }
}

/// Highest confidence first, one mapping per lemma. Ties keep store order.
fn rank_mappings(mut mappings: Vec<LemmaMapping>) -> Vec<LemmaMapping> {
    mappings.sort_by(|a, b| by_confidence_desc(&a.confidence, &b.confidence));
    let mut seen = HashSet::new();
    mappings.retain(|m| seen.insert(normalize(&m.lemma)));
    mappings
}
