use serde::{Deserialize, Serialize};

/// Which rule produced a lemma candidate.
///
/// Declaration order is generation priority: identity first, then
/// contraction expansion, noun endings, verb endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateRule {
    Identity,
    Contraction,
    NounEnding,
    VerbEnding,
}

/// A proposed dictionary headword for a word form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LemmaCandidate {
    /// Normalized candidate headword.
    pub text: String,
    pub rule: CandidateRule,
    /// Description of the matching table entry (e.g. "2nd decl. gen. sg.").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Position in the generated sequence; lower is tried first.
    pub rank: usize,
}

/// A surface token as it appears in a text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordForm {
    pub text: String,
    pub normalized: String,
    pub book_id: String,
    pub line_number: u32,
    /// 1-based position of the token in its line.
    pub position: u32,
    /// Character offset of the first character.
    pub char_start: usize,
    /// Character offset one past the last character.
    pub char_end: usize,
}

/// An authoritative word form → lemma association (a `lemma_map` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LemmaMapping {
    pub word_form: String,
    #[serde(default)]
    pub word_normalized: String,
    pub lemma: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub morph_info: Option<String>,
}

/// A headword's definition (a `dictionary_entries` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub headword: String,
    #[serde(default)]
    pub headword_normalized: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_plain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DictionaryEntry {
    /// The displayable definition: HTML if present, else plain text, else empty.
    pub fn definition(&self) -> &str {
        self.entry_html
            .as_deref()
            .or(self.entry_plain.as_deref())
            .unwrap_or("")
    }
}

/// One resolved lemma with its dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub lemma: String,
    /// Absent when a mapped lemma has no dictionary entry.
    pub entry: Option<DictionaryEntry>,
    /// Passed through from the lemma mapping; absent for generated candidates.
    pub confidence: Option<f64>,
    /// True when obtained from a lemma mapping rather than candidate generation.
    pub is_direct_match: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_info: Option<String>,
    /// Source tag of the lemma mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The candidate that hit the dictionary, for generated results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<LemmaCandidate>,
}

/// The outcome of resolving one word form.
///
/// An empty `entries` list means "no definition found"; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub word: String,
    pub normalized: String,
    pub language: String,
    /// Best first.
    pub entries: Vec<ResolvedEntry>,
}

impl ResolutionResult {
    pub fn empty(word: &str, normalized: &str, language: &str) -> Self {
        Self {
            word: word.to_string(),
            normalized: normalized.to_string(),
            language: language.to_string(),
            entries: Vec::new(),
        }
    }

    /// The best entry, if any.
    pub fn primary(&self) -> Option<&ResolvedEntry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when more than one lemma was found (homographs).
    pub fn is_ambiguous(&self) -> bool {
        self.entries.len() > 1
    }

    /// True when the result came from lemma mappings.
    pub fn is_direct_match(&self) -> bool {
        self.primary().is_some_and(|e| e.is_direct_match)
    }
}

/// A word form paired with its resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordResolution {
    pub form: WordForm,
    pub result: ResolutionResult,
}

/// All word resolutions for a text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResolution {
    pub book_id: String,
    pub line_number: u32,
    pub text: String,
    pub words: Vec<WordResolution>,
}
