// In-memory lemma map and dictionary, loadable from JSON exports of the
// `lemma_map` and `dictionary_entries` tables.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::Result;
use crate::normalize::{normalize, normalize_language};
use crate::store::{DictionaryStore, LemmaStore};
use crate::types::{DictionaryEntry, LemmaMapping};

/// Lemma mappings indexed by normalized word form.
#[derive(Debug, Default, Clone)]
pub struct MemoryLemmaStore {
    mappings: HashMap<String, Vec<LemmaMapping>>,
}

impl MemoryLemmaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mappings<I: IntoIterator<Item = LemmaMapping>>(mappings: I) -> Self {
        let mut store = Self::new();
        for m in mappings {
            store.insert(m);
        }
        store
    }

    /// Load a JSON array of `lemma_map` rows.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let rows: Vec<LemmaMapping> = serde_json::from_reader(reader)?;
        Ok(Self::from_mappings(rows))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Add a mapping. A missing `word_normalized` is computed from `word_form`.
    /// The mapping is indexed under both its normalized form and the
    /// normalization of its surface form, when they differ.
    pub fn insert(&mut self, mut mapping: LemmaMapping) {
        if mapping.word_normalized.is_empty() {
            mapping.word_normalized = normalize(&mapping.word_form);
        }
        let key = normalize(&mapping.word_normalized);
        let surface_key = normalize(&mapping.word_form);
        if surface_key != key && !surface_key.is_empty() {
            self.mappings
                .entry(surface_key)
                .or_default()
                .push(mapping.clone());
        }
        self.mappings.entry(key).or_default().push(mapping);
    }

    /// Number of indexed word forms.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Confidence-descending order; absent or NaN confidence sorts last.
pub(crate) fn by_confidence_desc(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    let a = a.filter(|c| !c.is_nan());
    let b = b.filter(|c| !c.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl LemmaStore for MemoryLemmaStore {
    fn lemma_mappings(&self, normalized: &str) -> Result<Vec<LemmaMapping>> {
        let mut found = self.mappings.get(normalized).cloned().unwrap_or_default();
        found.sort_by(|a, b| by_confidence_desc(&a.confidence, &b.confidence));
        Ok(found)
    }
}

/// Dictionary entries keyed by (language, normalized headword).
#[derive(Debug, Default, Clone)]
pub struct MemoryDictionary {
    // BTreeMap keeps headwords sorted for prefix search.
    entries: HashMap<String, BTreeMap<String, DictionaryEntry>>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I: IntoIterator<Item = DictionaryEntry>>(entries: I) -> Self {
        let mut dict = Self::new();
        for e in entries {
            dict.insert(e);
        }
        dict
    }

    /// Load a JSON array of `dictionary_entries` rows.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let rows: Vec<DictionaryEntry> = serde_json::from_reader(reader)?;
        Ok(Self::from_entries(rows))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Add an entry. The first entry inserted for a headword wins.
    pub fn insert(&mut self, mut entry: DictionaryEntry) {
        if entry.headword_normalized.is_empty() {
            entry.headword_normalized = normalize(&entry.headword);
        }
        entry.language = normalize_language(&entry.language);
        let key = normalize(&entry.headword_normalized);
        self.entries
            .entry(entry.language.clone())
            .or_default()
            .entry(key)
            .or_insert(entry);
    }

    /// Number of entries for a language.
    pub fn entry_count(&self, language: &str) -> usize {
        self.entries
            .get(&normalize_language(language))
            .map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|m| m.is_empty())
    }
}

impl DictionaryStore for MemoryDictionary {
    fn entry(&self, normalized_headword: &str, language: &str) -> Result<Option<DictionaryEntry>> {
        Ok(self
            .entries
            .get(language)
            .and_then(|m| m.get(normalized_headword))
            .cloned())
    }

    fn search(&self, pattern: &str, language: &str, limit: usize) -> Result<Vec<DictionaryEntry>> {
        let Some(headwords) = self.entries.get(language) else {
            return Ok(Vec::new());
        };

        // Literal prefix before the first wildcard narrows the range scan.
        let tokens = like_tokens(pattern);
        let literal_prefix: String = tokens
            .iter()
            .map_while(|t| match t {
                LikeToken::Literal(c) => Some(*c),
                _ => None,
            })
            .collect();
        Ok(headwords
            .range(literal_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&literal_prefix))
            .filter(|(k, _)| match_tokens(&tokens, k))
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    Literal(char),
    AnyRun,
    AnyOne,
}

// `\` makes the next character literal, as in `LIKE ... ESCAPE '\'`.
fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            c => LikeToken::Literal(c),
        });
    }
    tokens
}

/// SQL LIKE matching: `%` matches any run of characters, `_` exactly one,
/// and `\` escapes the character after it. Comparison is exact (inputs are
/// expected to be normalized already).
pub fn like_match(pattern: &str, text: &str) -> bool {
    match_tokens(&like_tokens(pattern), text)
}

fn match_tokens(p: &[LikeToken], text: &str) -> bool {
    let t: Vec<char> = text.chars().collect();

    // Iterative wildcard matching with single-star backtracking.
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        match p.get(pi) {
            Some(LikeToken::AnyOne) => {
                pi += 1;
                ti += 1;
            }
            Some(LikeToken::Literal(c)) if *c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            Some(LikeToken::AnyRun) => {
                star = Some((pi, ti));
                pi += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    pi = sp + 1;
                    ti = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    while p.get(pi) == Some(&LikeToken::AnyRun) {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(form: &str, lemma: &str, confidence: Option<f64>) -> LemmaMapping {
        LemmaMapping {
            word_form: form.to_string(),
            word_normalized: String::new(),
            lemma: lemma.to_string(),
            confidence,
            source: None,
            morph_info: None,
        }
    }

    fn entry(headword: &str, language: &str) -> DictionaryEntry {
        DictionaryEntry {
            headword: headword.to_string(),
            headword_normalized: String::new(),
            language: language.to_string(),
            entry_xml: None,
            entry_html: None,
            entry_plain: Some(format!("definition of {headword}")),
            source: None,
        }
    }

    #[test]
    fn test_mappings_sorted_by_confidence() {
        let store = MemoryLemmaStore::from_mappings([
            mapping("ἦν", "εἰμί", Some(0.5)),
            mapping("ἦν", "ἐάν", None),
            mapping("ἦν", "ἤν", Some(0.9)),
        ]);
        let found = store.lemma_mappings("ην").unwrap();
        let lemmas: Vec<_> = found.iter().map(|m| m.lemma.as_str()).collect();
        assert_eq!(lemmas, vec!["ἤν", "εἰμί", "ἐάν"]);
        assert_eq!(found[0].word_normalized, "ην");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = MemoryLemmaStore::from_mappings([
            mapping("λόγου", "λόγος", Some(1.0)),
            mapping("λόγου", "λόγιον", Some(1.0)),
        ]);
        let found = store.lemma_mappings("λογου").unwrap();
        assert_eq!(found[0].lemma, "λόγος");
        assert_eq!(found[1].lemma, "λόγιον");
    }

    #[test]
    fn test_unknown_word_is_empty() {
        let store = MemoryLemmaStore::new();
        assert!(store.lemma_mappings("ουδεν").unwrap().is_empty());
    }

    #[test]
    fn test_dictionary_first_entry_wins() {
        let mut first = entry("λόγος", "greek");
        first.source = Some("LSJ".to_string());
        let mut second = entry("λογος", "greek");
        second.source = Some("Middle Liddell".to_string());
        let dict = MemoryDictionary::from_entries([first, second]);

        let found = dict.entry("λογοσ", "greek").unwrap().unwrap();
        assert_eq!(found.source.as_deref(), Some("LSJ"));
        assert_eq!(found.headword_normalized, "λογοσ");
        assert_eq!(dict.entry_count("Greek"), 1);
    }

    #[test]
    fn test_dictionary_is_language_scoped() {
        let dict = MemoryDictionary::from_entries([entry("amor", "Latin")]);
        assert!(dict.entry("amor", "latin").unwrap().is_some());
        assert!(dict.entry("amor", "greek").unwrap().is_none());
    }

    #[test]
    fn test_search_prefix_with_limit() {
        let dict = MemoryDictionary::from_entries([
            entry("λόγος", "greek"),
            entry("λογίζομαι", "greek"),
            entry("λέγω", "greek"),
            entry("λογικός", "greek"),
        ]);
        let found = dict.search("λογ%", "greek", 10).unwrap();
        let heads: Vec<_> = found.iter().map(|e| e.headword_normalized.as_str()).collect();
        assert_eq!(heads, vec!["λογιζομαι", "λογικοσ", "λογοσ"]);

        assert_eq!(dict.search("λογ%", "greek", 2).unwrap().len(), 2);
        assert!(dict.search("λογ%", "latin", 10).unwrap().is_empty());
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("λογ%", "λογοσ"));
        assert!(like_match("%οσ", "λογοσ"));
        assert!(like_match("λ_γοσ", "λογοσ"));
        assert!(like_match("%", ""));
        assert!(like_match("λ%γ%σ", "λογοσ"));
        assert!(!like_match("λογ", "λογοσ"));
        assert!(!like_match("λ_σ", "λογοσ"));
        assert!(!like_match("", "λογοσ"));
    }

    #[test]
    fn test_like_match_escapes() {
        assert!(like_match("λ\\_γ%", "λ_γοσ"));
        assert!(!like_match("λ\\_γ%", "λογοσ"));
        assert!(like_match("100\\%", "100%"));
        assert!(!like_match("100\\%", "1000"));
    }

    #[test]
    fn test_search_escaped_prefix_is_literal() {
        let dict =
            MemoryDictionary::from_entries([entry("λόγος", "greek"), entry("λ_γος", "greek")]);
        let found = dict.search("λ\\_%", "greek", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].headword_normalized, "λ_γοσ");
    }

    #[test]
    fn test_nan_confidence_sorts_last_without_panic() {
        let store = MemoryLemmaStore::from_mappings((0..40).map(|i| {
            let confidence = match i % 3 {
                0 => Some(f64::NAN),
                1 => None,
                _ => Some(i as f64 / 100.0),
            };
            mapping("λόγου", &format!("lemma{i}"), confidence)
        }));
        let found = store.lemma_mappings("λογου").unwrap();
        assert_eq!(found.len(), 40);
        assert_eq!(found[0].lemma, "lemma38");
        let known: Vec<_> = found
            .iter()
            .take_while(|m| m.confidence.is_some_and(|c| !c.is_nan()))
            .collect();
        assert_eq!(known.len(), 13);
        assert!(known.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"[
            {"word_form": "ἀνθρώπου", "lemma": "ἄνθρωπος", "confidence": 0.8, "source": "generated"}
        ]"#;
        let store = MemoryLemmaStore::from_json_reader(json.as_bytes()).unwrap();
        let found = store.lemma_mappings("ανθρωπου").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source.as_deref(), Some("generated"));

        let json = r#"[{"headword": "ἄνθρωπος", "language": "greek", "entry_plain": "man"}]"#;
        let dict = MemoryDictionary::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(
            dict.entry("ανθρωποσ", "greek").unwrap().unwrap().definition(),
            "man"
        );
    }
}
