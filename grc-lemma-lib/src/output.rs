// Human-readable formatting of resolution results.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::*;

static BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static PARA_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Convert dictionary HTML to plain text.
///
/// `<br>` becomes a newline, `</p>` a blank line; other tags are dropped and
/// the common entities decoded.
pub fn html_to_plain(html: &str) -> String {
    let text = BR.replace_all(html, "\n");
    let text = PARA_END.replace_all(&text, "\n\n");
    let text = TAG.replace_all(&text, "");
    // &amp; last so "&amp;lt;" decodes to "&lt;", not "<".
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}

/// First non-empty line of an entry's definition, as plain text.
pub fn first_line(entry: &DictionaryEntry) -> String {
    let plain = match entry.entry_html.as_deref() {
        Some(html) => html_to_plain(html),
        None => entry.definition().to_string(),
    };
    plain
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

/// One line per resolved entry:
///
///   `lemma [direct] (0.90) morph: definition`
///   `lemma [candidate] definition`
///
/// or `no definition found for <word>`.
pub fn to_summary(result: &ResolutionResult) -> String {
    if result.entries.is_empty() {
        return format!("no definition found for {}", result.word);
    }

    result
        .entries
        .iter()
        .map(|e| {
            let mut line = e.lemma.clone();
            line.push_str(if e.is_direct_match {
                " [direct]"
            } else {
                " [candidate]"
            });
            if let Some(c) = e.confidence {
                line.push_str(&format!(" ({c:.2})"));
            }
            if let Some(morph) = e.morph_info.as_deref().filter(|m| !m.is_empty()) {
                line.push_str(&format!(" {morph}:"));
            }
            match &e.entry {
                Some(entry) => {
                    let def = first_line(entry);
                    if !def.is_empty() {
                        line.push(' ');
                        line.push_str(&def);
                    }
                }
                None => line.push_str(" (no dictionary entry)"),
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `word → lemma` for each word of a line; `word → ?` when unresolved.
pub fn line_to_summary(line: &LineResolution) -> String {
    line.words
        .iter()
        .map(|w| {
            let lemma = w
                .result
                .primary()
                .map(|e| e.lemma.as_str())
                .unwrap_or("?");
            format!("{} → {lemma}", w.form.text)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
