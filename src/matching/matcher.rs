// src/matching/matcher.rs

//! Classifies user-submitted entries against a reference roster as exact
//! matches, fuzzy suggestions or unmatched.

use std::collections::HashMap;

use super::normalize::{compact, lookup_keys};

/// Minimum similarity ratio for fuzzy suggestions.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Three-way classification of a batch of entries.
///
/// Every input lands in exactly one bucket (or is merged into `exact`
/// when a duplicate normalized form was already matched).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Canonical roster strings, deduplicated, first-seen input order
    pub exact: Vec<String>,
    /// (original input, best roster candidate) pairs, input order
    pub suggestions: Vec<(String, String)>,
    /// Original inputs with no match at any confidence
    pub unmatched: Vec<String>,
}

/// Match each input entry against the roster.
///
/// An entry is an exact match when any of its lookup keys (checked in
/// generation order) hits a roster key; the first-indexed roster item for
/// the first hitting key wins. Otherwise the entry's compact form is
/// fuzzy-matched against all roster compact forms with a minimum ratio of
/// `cutoff`; ties resolve to the first-seen roster item, so the output is
/// deterministic for identical inputs.
pub fn match_entries(inputs: &[String], roster: &[String], cutoff: f64) -> MatchOutcome {
    // Key index and compact index over the roster. Collisions keep the
    // first-inserted item in front, which is the one lookups return.
    let mut key_index: HashMap<String, Vec<&String>> = HashMap::new();
    let mut compact_index: HashMap<String, Vec<&String>> = HashMap::new();
    let mut compact_forms: Vec<String> = Vec::with_capacity(roster.len());

    for item in roster {
        let form = compact(item);
        compact_index.entry(form.clone()).or_default().push(item);
        compact_forms.push(form);

        for key in lookup_keys(item) {
            key_index.entry(key).or_default().push(item);
        }
    }

    let mut outcome = MatchOutcome::default();

    for entry in inputs {
        let exact_hit = lookup_keys(entry)
            .into_iter()
            .find_map(|key| key_index.get(&key).map(|items| items[0].clone()));

        if let Some(hit) = exact_hit {
            if !outcome.exact.contains(&hit) {
                outcome.exact.push(hit);
            }
            continue;
        }

        let entry_form = compact(entry);
        let mut best: Option<(f64, &str)> = None;

        for form in &compact_forms {
            let ratio = strsim::normalized_levenshtein(&entry_form, form);
            if ratio >= cutoff && best.is_none_or(|(top, _)| ratio > top) {
                best = Some((ratio, form));
            }
        }

        match best {
            Some((_, form)) => {
                let candidate = compact_index[form][0].clone();
                outcome.suggestions.push((entry.clone(), candidate));
            }
            None => outcome.unmatched.push(entry.clone()),
        }
    }

    outcome
}
