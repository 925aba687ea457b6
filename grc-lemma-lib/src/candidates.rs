// Heuristic lemma candidate generation for inflected Greek word forms.
//
// Candidates are produced in four families, in this priority order:
//   0. Identity (the normalized word itself)
//   1. Contraction expansion (elision, crasis, contract verbs)
//   2. Noun-ending stripping
//   3. Verb-ending stripping
//
// Within a family, longer endings are tried before shorter ones. The order of
// the output is the order in which the resolver looks them up in the dictionary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::rules::{RuleClass, RuleTable};
use crate::types::{CandidateRule, LemmaCandidate};

/// Knobs for candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Emit the normalized input as the first candidate.
    pub include_identity: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            include_identity: true,
        }
    }
}

/// Generates ordered, deduplicated lemma candidates from a rule table.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'t> {
    table: &'t RuleTable,
    options: GeneratorOptions,
}

impl CandidateGenerator<'static> {
    /// A generator over the embedded rule table.
    pub fn embedded() -> Self {
        Self::new(RuleTable::embedded())
    }
}

impl<'t> CandidateGenerator<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> GeneratorOptions {
        self.options
    }

    /// Generate candidates for a word form. Never fails; an unrecognized word
    /// yields only its identity candidate (or nothing if identity is disabled).
    pub fn generate(&self, word: &str) -> Vec<LemmaCandidate> {
        let normalized = normalize(word.trim());
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut raw: Vec<(String, CandidateRule, &str)> = Vec::new();
        if self.options.include_identity {
            raw.push((normalized.clone(), CandidateRule::Identity, ""));
        }

        let mut rewrites = Vec::new();
        for class in RuleClass::ALL {
            for rule in self.table.rules_for(class) {
                rewrites.clear();
                rule.apply(&normalized, self.table.min_stem, &mut rewrites);
                for text in rewrites.drain(..) {
                    raw.push((text, class.candidate_rule(), rule.label.as_str()));
                }
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(raw.len());
        for (text, rule, label) in raw {
            let text = normalize(&text);
            if text.is_empty() || !seen.insert(text.clone()) {
                continue;
            }
            out.push(LemmaCandidate {
                text,
                rule,
                label: label.to_string(),
                rank: out.len(),
            });
        }
        out
    }

    /// Candidate texts only, in lookup order.
    pub fn generate_texts(&self, word: &str) -> Vec<String> {
        self.generate(word).into_iter().map(|c| c.text).collect()
    }
}

/// Generate lemma candidates for a word using the embedded rule table.
pub fn generate_lemma_candidates(word: &str) -> Vec<String> {
    CandidateGenerator::embedded().generate_texts(word)
}
