use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is valid"));

/// Splits text into lowercase word tokens, keeping order and duplicates.
pub fn tokenize_text(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Normalises a single term the same way document text is tokenized.
///
/// Returns `None` when the input contains no word characters.
pub fn normalize_term(term: &str) -> Option<String> {
    let tokens = tokenize_text(term);
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Occurrence count of every token in `values`, ordered by token.
pub fn term_frequencies<'a, I>(values: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut frequencies = BTreeMap::new();
    for value in values {
        for token in tokenize_text(value) {
            *frequencies.entry(token).or_insert(0) += 1;
        }
    }
    frequencies
}
