// End-to-end resolution tests against in-memory stores.

use std::sync::Arc;
use std::thread;

use grc_lemma_lib::types::CandidateRule;
use grc_lemma_lib::{
    resolve_line, DictionaryEntry, DictionaryStore, LemmaError, LemmaMapping, LemmaResolver,
    LemmaStore, MemoryDictionary, MemoryLemmaStore, ResolverConfig, Result,
};

fn mapping(form: &str, lemma: &str, confidence: Option<f64>) -> LemmaMapping {
    LemmaMapping {
        word_form: form.to_string(),
        word_normalized: String::new(),
        lemma: lemma.to_string(),
        confidence,
        source: Some("treebank".to_string()),
        morph_info: None,
    }
}

fn entry(headword: &str, language: &str, definition: &str) -> DictionaryEntry {
    DictionaryEntry {
        headword: headword.to_string(),
        headword_normalized: String::new(),
        language: language.to_string(),
        entry_xml: None,
        entry_html: None,
        entry_plain: Some(definition.to_string()),
        source: Some("LSJ".to_string()),
    }
}

fn dictionary() -> MemoryDictionary {
    MemoryDictionary::from_entries([
        entry("ἄνθρωπος", "greek", "man, human being"),
        entry("λόγος", "greek", "word, speech"),
        entry("λόγον", "greek", "(fictitious neuter for testing)"),
        entry("θεός", "greek", "god"),
        entry("λύω", "greek", "loose"),
        entry("εἰμί", "greek", "be"),
        entry("ἤν", "greek", "see! lo!"),
        entry("δέ", "greek", "but, and"),
        entry("amor", "latin", "love"),
    ])
}

#[test]
fn test_highest_confidence_mapping_is_primary() {
    let lemmas = MemoryLemmaStore::from_mappings([
        mapping("ἦν", "ἤν", Some(0.5)),
        mapping("ἦν", "εἰμί", Some(0.9)),
    ]);
    let resolver = LemmaResolver::new(lemmas, dictionary());

    let result = resolver.resolve("ἦν", "greek").unwrap();
    let primary = result.primary().unwrap();
    assert_eq!(primary.lemma, "εἰμί");
    assert!(primary.is_direct_match);
    assert_eq!(primary.confidence, Some(0.9));
    assert_eq!(primary.entry.as_ref().unwrap().definition(), "be");
    assert_eq!(primary.source.as_deref(), Some("treebank"));

    // Homograph: both lemmas reported, confidence-descending.
    assert!(result.is_ambiguous());
    assert_eq!(result.entries[1].lemma, "ἤν");
    assert_eq!(result.entries[1].confidence, Some(0.5));
    assert!(result.entries[1].is_direct_match);
}

#[test]
fn test_mapping_wins_over_candidates() {
    // The genitive would also be reached by ending rules; the mapping decides.
    let lemmas = MemoryLemmaStore::from_mappings([mapping("λόγου", "λόγος", Some(1.0))]);
    let resolver = LemmaResolver::new(lemmas, dictionary());

    let result = resolver.resolve("λόγου", "greek").unwrap();
    assert_eq!(result.entries.len(), 1);
    assert!(result.is_direct_match());
    assert!(result.entries[0].candidate.is_none());
}

#[test]
fn test_mapping_without_dictionary_entry_is_reported() {
    let mut m = mapping("ἔβη", "βαίνω", Some(0.7));
    m.morph_info = Some("v3saia".to_string());
    let resolver = LemmaResolver::new(MemoryLemmaStore::from_mappings([m]), dictionary());

    let result = resolver.resolve("ἔβη", "greek").unwrap();
    let primary = result.primary().unwrap();
    assert_eq!(primary.lemma, "βαίνω");
    assert!(primary.entry.is_none());
    assert_eq!(primary.morph_info.as_deref(), Some("v3saia"));
}

#[test]
fn test_candidate_hit_is_not_direct() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());

    let result = resolver.resolve("θεοῦ", "greek").unwrap();
    assert_eq!(result.entries.len(), 1);
    let primary = result.primary().unwrap();
    assert_eq!(primary.lemma, "θεός");
    assert!(!primary.is_direct_match);
    assert_eq!(primary.confidence, None);
    assert_eq!(primary.candidate.as_ref().unwrap().text, "θεοσ");
}

#[test]
fn test_genitive_resolves_to_nominative() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());

    let result = resolver.resolve("ἀνθρώπου", "greek").unwrap();
    assert_eq!(result.normalized, "ανθρωπου");
    let primary = result.primary().unwrap();
    assert_eq!(primary.lemma, "ἄνθρωπος");
    assert!(!primary.is_direct_match);
    assert_eq!(primary.confidence, None);
    assert_eq!(
        primary.entry.as_ref().unwrap().definition(),
        "man, human being"
    );
}

#[test]
fn test_identity_candidate_tried_first() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());

    let result = resolver.resolve("Λόγος.", "greek").unwrap();
    let primary = result.primary().unwrap();
    assert_eq!(primary.lemma, "λόγος");
    assert_eq!(primary.candidate.as_ref().unwrap().rule, CandidateRule::Identity);
}

#[test]
fn test_augmented_aorist() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    let result = resolver.resolve("ἔλυσα", "greek").unwrap();
    assert_eq!(result.primary().unwrap().lemma, "λύω");
}

#[test]
fn test_elision() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    let result = resolver.resolve("δ’", "greek").unwrap();
    assert_eq!(result.primary().unwrap().lemma, "δέ");
}

#[test]
fn test_unknown_word_is_empty_not_error() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    let result = resolver.resolve("ξυζ", "greek").unwrap();
    assert!(result.is_empty());
    assert!(!result.is_direct_match());
    assert_eq!(result.word, "ξυζ");
}

#[test]
fn test_multiple_candidate_hits_in_generator_order() {
    let config = ResolverConfig {
        candidate_hits: 3,
        ..ResolverConfig::default()
    };
    let resolver = LemmaResolver::with_config(MemoryLemmaStore::new(), dictionary(), config);

    let result = resolver.resolve("λόγου", "greek").unwrap();
    let lemmas: Vec<_> = result.entries.iter().map(|e| e.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["λόγος", "λόγον"]);
    assert!(result.entries.iter().all(|e| !e.is_direct_match));
    let ranks: Vec<_> = result
        .entries
        .iter()
        .map(|e| e.candidate.as_ref().unwrap().rank)
        .collect();
    assert!(ranks[0] < ranks[1]);
}

#[test]
fn test_non_greek_tries_identity_only() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    assert_eq!(
        resolver.resolve("Amor", "Latin").unwrap().primary().unwrap().lemma,
        "amor"
    );
    assert!(resolver.resolve("amoris", "latin").unwrap().is_empty());
}

#[test]
fn test_candidates_agree_with_resolution_language() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());

    // Latin looks up the word itself only, so "amoris" has one candidate and no hit.
    let latin = resolver.candidates("amoris", "latin");
    assert_eq!(latin.len(), 1);
    assert!(resolver.resolve("amoris", "latin").unwrap().is_empty());

    // Greek candidates include the one resolution hits.
    let greek = resolver.candidates("θεοῦ", "greek");
    let hit = resolver.resolve("θεοῦ", "greek").unwrap();
    let text = &hit.primary().unwrap().candidate.as_ref().unwrap().text;
    assert!(greek.iter().any(|c| &c.text == text));
}

#[test]
fn test_lemma_for() {
    let lemmas = MemoryLemmaStore::from_mappings([
        mapping("ἦν", "ἤν", Some(0.2)),
        mapping("ἦν", "εἰμί", Some(0.8)),
    ]);
    let resolver = LemmaResolver::new(lemmas, dictionary());
    assert_eq!(resolver.lemma_for("ἦν").unwrap().as_deref(), Some("εἰμί"));
    assert_eq!(resolver.lemma_for("λόγου").unwrap(), None);
}

#[test]
fn test_search_by_prefix() {
    let config = ResolverConfig {
        search_limit: 1,
        ..ResolverConfig::default()
    };
    let resolver = LemmaResolver::with_config(MemoryLemmaStore::new(), dictionary(), config);
    let found = resolver.search("ΛΟΓ", "greek").unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].headword_normalized.starts_with("λογ"));
    assert!(resolver.search("", "greek").unwrap().is_empty());
}

struct UnavailableLemmas;

impl LemmaStore for UnavailableLemmas {
    fn lemma_mappings(&self, _normalized: &str) -> Result<Vec<LemmaMapping>> {
        Err(LemmaError::store_unavailable("lemma", "connection refused"))
    }
}

struct UnavailableDictionary;

impl DictionaryStore for UnavailableDictionary {
    fn entry(&self, _headword: &str, _language: &str) -> Result<Option<DictionaryEntry>> {
        Err(LemmaError::store_unavailable("dictionary", "disk I/O error"))
    }

    fn search(&self, _pattern: &str, _language: &str, _limit: usize) -> Result<Vec<DictionaryEntry>> {
        Err(LemmaError::store_unavailable("dictionary", "disk I/O error"))
    }
}

#[test]
fn test_lemma_store_failure_propagates() {
    let resolver = LemmaResolver::new(UnavailableLemmas, dictionary());
    let err = resolver.resolve("λόγου", "greek").unwrap_err();
    assert!(err.is_store_error());
    assert_eq!(err.to_string(), "lemma store unavailable: connection refused");
}

#[test]
fn test_dictionary_failure_propagates() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), UnavailableDictionary);
    let err = resolver.resolve("λόγου", "greek").unwrap_err();
    assert!(err.is_store_error());

    // An empty word never reaches the stores.
    assert!(resolver.resolve("", "greek").unwrap().is_empty());
    assert!(resolver.search("λογ", "greek").unwrap_err().is_store_error());
}

#[test]
fn test_batch_keeps_input_order() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    let words = ["θεοῦ", "ξυζ", "ἀνθρώπου", "λόγου"];
    let results = resolver.resolve_batch(&words, "greek").unwrap();
    let lemmas: Vec<_> = results
        .iter()
        .map(|r| r.primary().map(|e| e.lemma.as_str()).unwrap_or("-"))
        .collect();
    assert_eq!(lemmas, vec!["θεός", "-", "ἄνθρωπος", "λόγος"]);
}

#[test]
fn test_batch_stops_on_store_error() {
    let resolver = LemmaResolver::new(UnavailableLemmas, dictionary());
    assert!(resolver.resolve_batch(&["λόγου", "θεοῦ"], "greek").is_err());
}

#[test]
fn test_shared_resolver_across_threads() {
    let lemmas = Arc::new(MemoryLemmaStore::from_mappings([mapping(
        "ἦν",
        "εἰμί",
        Some(0.9),
    )]));
    let resolver = Arc::new(LemmaResolver::new(lemmas, Arc::new(dictionary())));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || {
                let a = resolver.resolve("ἦν", "greek").unwrap();
                let b = resolver.resolve("θεοῦ", "greek").unwrap();
                (a.primary().unwrap().lemma.clone(), b.primary().unwrap().lemma.clone())
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), ("εἰμί".to_string(), "θεός".to_string()));
    }
}

#[test]
fn test_resolve_line() {
    let resolver = LemmaResolver::new(MemoryLemmaStore::new(), dictionary());
    let line = resolve_line(&resolver, "test", 3, "θεοῦ · ἀνθρώπου ξυζ", "greek").unwrap();
    assert_eq!(line.line_number, 3);
    assert_eq!(line.words.len(), 3);
    assert_eq!(line.words[0].result.primary().unwrap().lemma, "θεός");
    assert_eq!(line.words[1].form.position, 3);
    assert_eq!(line.words[1].result.primary().unwrap().lemma, "ἄνθρωπος");
    assert!(line.words[2].result.is_empty());
}
