// src/matching/normalize.rs

//! Text canonicalization for comparison and filtering.

use std::collections::HashSet;
use std::hash::Hash;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalize free text for comparison.
///
/// Trims, folds diacritics (NFKD decomposition with combining marks
/// stripped), turns periods into spaces, collapses whitespace runs and
/// lowercases. Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let folded: String = trimmed.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let spaced = folded.replace('.', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed.to_lowercase()
}

/// Normalized form with all spaces removed, used for fuzzy comparison.
pub fn compact(text: &str) -> String {
    normalize(text).split(' ').collect()
}

/// Lookup keys derived from a name, in fixed generation order:
/// full normalized form, last token, first-initial + last token with and
/// without a separating space. The order matters: the matcher takes the
/// first key that hits the index.
///
/// Supports matching abbreviated teacher names ("J. Kowalski") against
/// full roster names.
pub fn lookup_keys(text: &str) -> Vec<String> {
    let norm = normalize(text);
    if norm.is_empty() {
        return Vec::new();
    }

    let tokens: Vec<&str> = norm.split(' ').collect();
    let mut keys = vec![norm.clone()];

    if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
        keys.push(last.to_string());

        if let Some(initial) = first.chars().next() {
            keys.push(format!("{initial} {last}"));
            keys.push(format!("{initial}{last}"));
        }
    }

    dedup_preserving_order(keys)
}

/// Remove duplicates from a sequence, keeping first occurrences in order.
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }

    result
}

/// Split raw user-submitted filter text on commas and semicolons,
/// trimming each piece and dropping empties.
pub fn split_raw_entries(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
