// src/pipeline/stats.rs

//! Incremental per-teacher and total substitution statistics.
//!
//! Invoked only when the entries checksum differs from the stored one;
//! an unchanged cycle must pass the previous values through untouched.

use std::collections::BTreeMap;

use crate::models::Section;

/// Title marker for the section grouping entries with no assigned class.
pub const UNASSIGNED_MARKER: &str = "Zastępstwa z nieprzypisanymi klasami!";

/// Label preceding the teacher name inside an unassigned-class entry.
pub const TEACHER_LABEL: &str = "**Nauczyciel:**";

/// Updated (total count, per-teacher counters) after a detected change.
///
/// The total grows by the number of entries across all sections. Sections
/// under the unassigned-class marker credit each labelled entry to the
/// extracted teacher name; every other section credits its entry count to
/// the key derived from its title. Counts are never decremented.
pub fn accumulate(
    previous_count: u64,
    previous_stats: &BTreeMap<String, u64>,
    sections: &[Section],
) -> (u64, BTreeMap<String, u64>) {
    let increment: u64 = sections.iter().map(|s| s.entries.len() as u64).sum();
    let mut stats = previous_stats.clone();

    for section in sections {
        let title = section.title.trim();

        if title.contains(UNASSIGNED_MARKER) {
            for entry in &section.entries {
                if let Some(teacher) = extract_teacher(entry) {
                    *stats.entry(teacher).or_insert(0) += 1;
                }
            }
            continue;
        }

        let key = truncate_at_separators(title).trim().to_string();
        *stats.entry(key).or_insert(0) += section.entries.len() as u64;
    }

    (previous_count + increment, stats)
}

/// Teacher name from an unassigned-class entry: the text after the label
/// up to the first newline, cut at the earlier of "/" and " - ".
fn extract_teacher(entry: &str) -> Option<String> {
    let (_, rest) = entry.split_once(TEACHER_LABEL)?;
    let line = rest.trim().lines().next().unwrap_or("").trim();
    Some(truncate_at_separators(line).trim().to_string())
}

/// Cut at the first "/" or " - ", whichever comes first in the string.
///
/// Heuristic coupled to the upstream page format; kept exactly as the
/// scraped source requires.
fn truncate_at_separators(text: &str) -> &str {
    let mut end = text.len();
    if let Some(i) = text.find('/') {
        end = end.min(i);
    }
    if let Some(i) = text.find(" - ") {
        end = end.min(i);
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_count_grows_by_entry_sum() {
        let sections = vec![
            Section::new("3A / J. Kowalski", vec!["a".into(), "b".into()]),
            Section::new("1B - wf", vec!["c".into()]),
        ];

        let (count, _) = accumulate(5, &BTreeMap::new(), &sections);
        assert_eq!(count, 8);
    }

    #[test]
    fn test_title_key_truncation() {
        let sections = vec![
            Section::new("3A / J. Kowalski", vec!["a".into(), "b".into()]),
            Section::new("Anna Nowak - matematyka", vec!["c".into()]),
        ];

        let (_, stats) = accumulate(0, &BTreeMap::new(), &sections);
        assert_eq!(stats["3A"], 2);
        assert_eq!(stats["Anna Nowak"], 1);
    }

    #[test]
    fn test_unassigned_entries_credit_teachers() {
        let sections = vec![Section::new(
            format!("{UNASSIGNED_MARKER} (3 pozycje)"),
            vec![
                format!("{TEACHER_LABEL} Jan Kowalski / chemia\nlekcja 3"),
                format!("{TEACHER_LABEL} Jan Kowalski - fizyka"),
                "wpis bez etykiety".to_string(),
            ],
        )];

        let (count, stats) = accumulate(0, &BTreeMap::new(), &sections);
        // Each labelled entry counts once; the unlabelled one only adds
        // to the total.
        assert_eq!(stats["Jan Kowalski"], 2);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_monotonic_over_cycles() {
        let mut count = 0;
        let mut stats = BTreeMap::new();
        let mut total_entries = 0;

        for cycle in 0..4 {
            let sections = vec![Section::new(
                "2D",
                (0..=cycle).map(|i| format!("wpis {i}")).collect(),
            )];
            total_entries += sections[0].entries.len() as u64;

            let (new_count, new_stats) = accumulate(count, &stats, &sections);
            assert!(new_count >= count);
            count = new_count;
            stats = new_stats;
        }

        assert_eq!(count, total_entries);
        assert_eq!(stats["2D"], total_entries);
    }

    #[test]
    fn test_separator_order_is_first_occurrence() {
        assert_eq!(truncate_at_separators("a - b/c"), "a");
        assert_eq!(truncate_at_separators("a/b - c"), "a");
        assert_eq!(truncate_at_separators("plain"), "plain");
    }
}
