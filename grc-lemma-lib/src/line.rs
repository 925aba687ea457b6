// Line-level resolution: split a text line into word forms and resolve each.

use crate::errors::Result;
use crate::normalize::lookup_key;
use crate::resolver::LemmaResolver;
use crate::store::{DictionaryStore, LemmaStore};
use crate::types::{LineResolution, WordForm, WordResolution};

/// Split a line on whitespace into word forms.
///
/// Positions are 1-based and count every token, including pure punctuation
/// (which is not returned). Character spans are `[start, end)` char offsets
/// into `text`.
pub fn word_forms(book_id: &str, line_number: u32, text: &str) -> Vec<WordForm> {
    let mut forms = Vec::new();
    let mut position = 0u32;
    let mut start: Option<usize> = None;
    let mut token = String::new();

    let chars = text.chars().chain(std::iter::once(' ')).enumerate();
    for (i, c) in chars {
        if !c.is_whitespace() {
            start.get_or_insert(i);
            token.push(c);
            continue;
        }
        let Some(char_start) = start.take() else {
            continue;
        };
        position += 1;
        let normalized = lookup_key(&token);
        if !normalized.is_empty() {
            forms.push(WordForm {
                text: std::mem::take(&mut token),
                normalized,
                book_id: book_id.to_string(),
                line_number,
                position,
                char_start,
                char_end: i,
            });
        }
        token.clear();
    }
    forms
}

/// Resolve every word of a line.
pub fn resolve_line<L, D>(
    resolver: &LemmaResolver<L, D>,
    book_id: &str,
    line_number: u32,
    text: &str,
    language: &str,
) -> Result<LineResolution>
where
    L: LemmaStore,
    D: DictionaryStore,
{
    let words = word_forms(book_id, line_number, text)
        .into_iter()
        .map(|form| {
            let result = resolver.resolve(&form.text, language)?;
            Ok(WordResolution { form, result })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LineResolution {
        book_id: book_id.to_string(),
        line_number,
        text: text.to_string(),
        words,
    })
}
