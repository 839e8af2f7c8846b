// src/services/extract.rs

//! Extraction of (extra info, substitution sections) from fetched page
//! text, filtered by a server's selected classes and teachers.

use std::collections::HashSet;

use crate::matching::{compact, lookup_keys, normalize};
use crate::models::Section;
use crate::pipeline::stats::{TEACHER_LABEL, UNASSIGNED_MARKER};

/// Turns raw page text into the per-server view the checksum engine and
/// notifier consume.
pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        page: &str,
        selected_classes: &[String],
        selected_teachers: &[String],
        all_classes: &[String],
    ) -> (String, Vec<Section>);
}

/// Parser for the plain-text substitution layout.
///
/// The page is read as blank-line-separated blocks: the first block is
/// the extra-info header (date, announcements), every later block is a
/// section whose first line is the title (teacher name, optionally
/// followed by "/" or " - " and a subject) and whose remaining lines are
/// entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionExtractor;

impl SubstitutionExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_blocks(page: &str) -> (String, Vec<Section>) {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in page.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line.trim());
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        let mut blocks = blocks.into_iter();
        let extra = blocks
            .next()
            .map(|lines| lines.join("\n"))
            .unwrap_or_default();

        let sections = blocks
            .map(|lines| {
                let title = lines[0].to_string();
                let entries = lines[1..].iter().map(|s| s.to_string()).collect();
                Section { title, entries }
            })
            .collect();

        (extra, sections)
    }
}

impl Extractor for SubstitutionExtractor {
    fn extract(
        &self,
        page: &str,
        selected_classes: &[String],
        selected_teachers: &[String],
        all_classes: &[String],
    ) -> (String, Vec<Section>) {
        let (extra, sections) = Self::parse_blocks(page);

        let unfiltered = selected_classes.is_empty() && selected_teachers.is_empty();
        if unfiltered {
            return (extra, sections);
        }

        let known: HashSet<String> = all_classes.iter().map(|c| compact(c)).collect();
        let wanted: HashSet<String> = selected_classes.iter().map(|c| compact(c)).collect();

        let mut kept = Vec::new();
        for section in sections {
            if section.title.contains(UNASSIGNED_MARKER) {
                // Unassigned entries are only relevant to teacher filters.
                let entries: Vec<String> = section
                    .entries
                    .iter()
                    .filter(|entry| {
                        labelled_teacher(entry)
                            .is_some_and(|name| matches_any_teacher(&name, selected_teachers))
                    })
                    .cloned()
                    .collect();

                if !entries.is_empty() {
                    kept.push(Section::new(section.title, entries));
                }
                continue;
            }

            if matches_any_teacher(title_head(&section.title), selected_teachers) {
                kept.push(section);
                continue;
            }

            if !wanted.is_empty() {
                let entries: Vec<String> = section
                    .entries
                    .iter()
                    .filter(|entry| entry_concerns_classes(entry, &wanted, &known))
                    .cloned()
                    .collect();

                if !entries.is_empty() {
                    kept.push(Section::new(section.title, entries));
                }
            }
        }

        (extra, kept)
    }
}

/// The teacher part of a section title, before any "/" or " - " suffix.
fn title_head(title: &str) -> &str {
    let mut end = title.len();
    if let Some(i) = title.find('/') {
        end = end.min(i);
    }
    if let Some(i) = title.find(" - ") {
        end = end.min(i);
    }
    title[..end].trim()
}

/// Teacher name from an entry's label, if present.
fn labelled_teacher(entry: &str) -> Option<String> {
    let (_, rest) = entry.split_once(TEACHER_LABEL)?;
    Some(title_head(rest.trim().lines().next().unwrap_or("")).to_string())
}

/// Whether two name spellings refer to the same teacher: their lookup-key
/// sets (space-stripped) intersect, so "J. Kowalski" meets "Jan Kowalski".
fn matches_any_teacher(name: &str, selected: &[String]) -> bool {
    if selected.is_empty() {
        return false;
    }

    let name_keys: HashSet<String> = lookup_keys(name)
        .into_iter()
        .map(|k| k.replace(' ', ""))
        .collect();

    selected.iter().any(|teacher| {
        lookup_keys(teacher)
            .into_iter()
            .any(|k| name_keys.contains(&k.replace(' ', "")))
    })
}

/// Whether an entry concerns one of the wanted classes.
///
/// An entry naming no known class at all is general information and is
/// kept for every class filter.
fn entry_concerns_classes(
    entry: &str,
    wanted: &HashSet<String>,
    known: &HashSet<String>,
) -> bool {
    let tokens: Vec<String> = normalize(entry)
        .split([' ', '/', ','])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let mut mentions_known = false;
    for token in &tokens {
        if wanted.contains(token) {
            return true;
        }
        if known.contains(token) {
            mentions_known = true;
        }
    }

    !mentions_known
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
Zastępstwa na dzień 03.09.2025
Prosimy o sprawdzenie sal.

Jan Kowalski / matematyka
lekcja 2: 1A - sala 14
lekcja 5: 2B - sala 3

Anna Nowak - chemia
lekcja 1: 3C - odwołana

Zastępstwa z nieprzypisanymi klasami!
**Nauczyciel:** Jan Kowalski / fizyka
**Nauczyciel:** Piotr Wiśniewski
";

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all_classes() -> Vec<String> {
        owned(&["1A", "2B", "3C"])
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let (extra, sections) =
            SubstitutionExtractor::new().extract(PAGE, &[], &[], &all_classes());

        assert!(extra.starts_with("Zastępstwa na dzień 03.09.2025"));
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "Jan Kowalski / matematyka");
        assert_eq!(sections[0].entries.len(), 2);
    }

    #[test]
    fn test_class_filter_trims_entries() {
        let (_, sections) = SubstitutionExtractor::new().extract(
            PAGE,
            &owned(&["1A"]),
            &[],
            &all_classes(),
        );

        // Kowalski's section keeps only the 1A entry; Nowak's section and
        // the unassigned block disappear.
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].entries, owned(&["lekcja 2: 1A - sala 14"]));
    }

    #[test]
    fn test_teacher_filter_keeps_whole_section() {
        let (_, sections) = SubstitutionExtractor::new().extract(
            PAGE,
            &[],
            &owned(&["Anna Nowak"]),
            &all_classes(),
        );

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Anna Nowak - chemia");
        assert_eq!(sections[0].entries.len(), 1);
    }

    #[test]
    fn test_teacher_filter_matches_unassigned_entries() {
        let (_, sections) = SubstitutionExtractor::new().extract(
            PAGE,
            &[],
            &owned(&["Piotr Wiśniewski"]),
            &all_classes(),
        );

        assert_eq!(sections.len(), 1);
        assert!(sections[0].title.contains(UNASSIGNED_MARKER));
        assert_eq!(
            sections[0].entries,
            owned(&["**Nauczyciel:** Piotr Wiśniewski"])
        );
    }

    #[test]
    fn test_abbreviated_teacher_spelling_matches() {
        let (_, sections) = SubstitutionExtractor::new().extract(
            PAGE,
            &[],
            &owned(&["J. Kowalski"]),
            &all_classes(),
        );

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&"Jan Kowalski / matematyka"));
    }

    #[test]
    fn test_empty_page() {
        let (extra, sections) =
            SubstitutionExtractor::new().extract("", &[], &[], &all_classes());
        assert!(extra.is_empty());
        assert!(sections.is_empty());
    }
}
