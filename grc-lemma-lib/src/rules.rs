// Ending and contraction rule tables for lemma candidate generation.
//
// The default table is compiled from `data/greek-endings.xml` by build.rs and
// embedded as JSON. Alternative tables can be loaded from JSON at runtime.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{LemmaError, Result};
use crate::normalize::normalize;
use crate::types::CandidateRule;

const EMBEDDED_JSON: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/rules.json"));

static EMBEDDED: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_json_slice(EMBEDDED_JSON).expect("embedded rule table is invalid")
});

/// Rule family; families are applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleClass {
    #[serde(rename = "contraction")]
    Contraction,
    #[serde(rename = "noun")]
    NounEnding,
    #[serde(rename = "verb")]
    VerbEnding,
}

impl RuleClass {
    pub const ALL: [RuleClass; 3] = [
        RuleClass::Contraction,
        RuleClass::NounEnding,
        RuleClass::VerbEnding,
    ];

    /// The candidate tag for candidates produced by this class.
    pub fn candidate_rule(self) -> CandidateRule {
        match self {
            RuleClass::Contraction => CandidateRule::Contraction,
            RuleClass::NounEnding => CandidateRule::NounEnding,
            RuleClass::VerbEnding => CandidateRule::VerbEnding,
        }
    }
}

/// Where in the word a rule's pattern must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Suffix,
    Prefix,
    Whole,
}

/// One table entry: replace `pattern` by each of `replacements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingRule {
    pub class: RuleClass,
    #[serde(default)]
    pub anchor: Anchor,
    pub pattern: String,
    pub replacements: Vec<String>,
    #[serde(default)]
    pub label: String,
    /// Past indicative ending: also try the stem without the syllabic augment.
    #[serde(default)]
    pub augment: bool,
}

impl EndingRule {
    /// Apply this rule to a normalized word, pushing every rewrite into `out`.
    ///
    /// Suffix rules keep at least `min_stem` characters of the word.
    pub fn apply(&self, word: &str, min_stem: usize, out: &mut Vec<String>) {
        match self.anchor {
            Anchor::Whole => {
                if word == self.pattern {
                    out.extend(self.replacements.iter().cloned());
                }
            }
            Anchor::Prefix => {
                if let Some(rest) = word.strip_prefix(self.pattern.as_str()) {
                    if !rest.is_empty() {
                        out.extend(self.replacements.iter().map(|r| format!("{r}{rest}")));
                    }
                }
            }
            Anchor::Suffix => {
                let Some(stem) = word.strip_suffix(self.pattern.as_str()) else {
                    return;
                };
                if stem.chars().count() < min_stem {
                    return;
                }
                out.extend(self.replacements.iter().map(|r| format!("{stem}{r}")));

                if self.augment {
                    if let Some(unaugmented) = stem.strip_prefix('ε') {
                        if unaugmented.chars().count() >= min_stem {
                            out.extend(
                                self.replacements
                                    .iter()
                                    .map(|r| format!("{unaugmented}{r}")),
                            );
                        }
                    }
                }
            }
        }
    }
}

/// A validated, normalized set of ending rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Minimum stem length (in characters) left after stripping a suffix.
    pub min_stem: usize,
    pub rules: Vec<EndingRule>,
}

impl RuleTable {
    /// Validate and normalize a table.
    pub fn new(min_stem: usize, rules: Vec<EndingRule>) -> Result<Self> {
        if min_stem == 0 {
            return Err(LemmaError::InvalidRules(
                "min_stem must be at least 1".to_string(),
            ));
        }

        let mut normalized = Vec::with_capacity(rules.len());
        for (i, mut rule) in rules.into_iter().enumerate() {
            rule.pattern = normalize(&rule.pattern);
            rule.replacements = rule
                .replacements
                .iter()
                .map(|r| normalize(r))
                .filter(|r| !r.is_empty())
                .collect();
            if rule.pattern.is_empty() {
                return Err(LemmaError::InvalidRules(format!(
                    "rule {i} ({}) has an empty pattern",
                    rule.label
                )));
            }
            if rule.replacements.is_empty() {
                return Err(LemmaError::InvalidRules(format!(
                    "rule {i} ({}) has no replacements",
                    rule.label
                )));
            }
            normalized.push(rule);
        }

        Ok(Self {
            min_stem,
            rules: normalized,
        })
    }

    /// The table compiled into the crate.
    pub fn embedded() -> &'static RuleTable {
        &EMBEDDED
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RuleTable = serde_json::from_slice(bytes)?;
        Self::new(raw.min_stem, raw.rules)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RuleTable = serde_json::from_reader(reader)?;
        Self::new(raw.min_stem, raw.rules)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Rules of one class, longest pattern first; ties keep table order.
    pub fn rules_for(&self, class: RuleClass) -> Vec<&EndingRule> {
        let mut rules: Vec<&EndingRule> =
            self.rules.iter().filter(|r| r.class == class).collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.pattern.chars().count()));
        rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
