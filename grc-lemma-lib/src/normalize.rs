// Accent-, case- and sigma-insensitive normalization of Greek text.
//
// Every store key (lemma map word forms, dictionary headwords) and every
// generated candidate goes through `normalize`, so two spellings that differ
// only in diacritics, letter case or final/medial sigma compare equal.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const FINAL_SIGMA: char = 'ς';
const MEDIAL_SIGMA: char = 'σ';

// Spacing diacritics and elision marks that survive NFD as standalone
// characters. Combining marks are removed separately.
const SPACING_MARKS: &[char] = &[
    '\u{0027}', // apostrophe
    '\u{0060}', // grave accent
    '\u{037A}', // ypogegrammeni (spacing iota subscript)
    '\u{00A8}', // diaeresis
    '\u{00B4}', // acute accent
    '\u{02BC}', // modifier letter apostrophe
    '\u{0384}', // tonos
    '\u{0385}', // dialytika tonos
    '\u{1FBD}', // koronis
    '\u{1FBF}', // psili
    '\u{1FC0}', // perispomeni
    '\u{1FC1}', // dialytika and perispomeni
    '\u{1FCD}', // psili and varia
    '\u{1FCE}', // psili and oxia
    '\u{1FCF}', // psili and perispomeni
    '\u{1FDD}', // dasia and varia
    '\u{1FDE}', // dasia and oxia
    '\u{1FDF}', // dasia and perispomeni
    '\u{1FED}', // dialytika and varia
    '\u{1FEE}', // dialytika and oxia
    '\u{1FEF}', // varia
    '\u{1FFD}', // oxia
    '\u{1FFE}', // dasia
    '\u{2019}', // right single quotation mark
];

// Sentence punctuation removed from a clicked/typed word before lookup.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\u{00B7}', '\u{0387}', '\u{037E}',
];

/// Normalize text for comparison: lower-case, strip diacritics, map final
/// sigma to medial sigma.
///
/// Total and idempotent. Text without Greek passes through apart from case
/// folding and removal of combining marks.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|&c| !is_combining_mark(c) && !SPACING_MARKS.contains(&c))
        .map(|c| if c == FINAL_SIGMA { MEDIAL_SIGMA } else { c })
        .collect();
    stripped.nfc().collect()
}

/// Remove sentence punctuation, including the Greek question mark and ano teleia.
pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
}

/// The key a word is looked up under: punctuation removed, then normalized.
pub fn lookup_key(word: &str) -> String {
    normalize(&strip_punctuation(word))
}

/// Canonical form of a language tag ("Greek " → "greek").
pub fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase()
}

/// True if the text contains a letter from the Greek or Greek Extended blocks.
pub fn is_greek(text: &str) -> bool {
    text.chars().any(|c| {
        c.is_alphabetic() && matches!(c, '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}')
    })
}
