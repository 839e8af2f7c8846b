// src/pipeline/checksum.rs

//! Content checksums used as the change-detection oracle.
//!
//! Two scrape results count as "unchanged" iff both the extra-info
//! checksum and the entries checksum equal the stored run state.

use sha2::{Digest, Sha256};

use crate::models::Section;

/// SHA-256 hex digest of trimmed text.
pub fn checksum_text(text: &str) -> String {
    digest(text.trim().as_bytes())
}

/// SHA-256 hex digest of an ordered collection of (title, entries) pairs.
///
/// Pairs are sorted by raw title and entries sorted within each pair
/// before hashing, so the digest is independent of the original ordering.
pub fn checksum_sections(sections: &[Section]) -> String {
    let mut sorted: Vec<&Section> = sections.iter().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title));

    let mut parts: Vec<String> = Vec::new();
    for section in sorted {
        parts.push(section.title.trim().to_string());

        let mut entries: Vec<&str> = section.entries.iter().map(String::as_str).collect();
        entries.sort_unstable();
        parts.extend(entries.iter().map(|e| e.trim().to_string()));
    }

    digest(parts.join("\n").as_bytes())
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section::new("3A", vec!["lekcja 2: fizyka".into(), "lekcja 1: chemia".into()]),
            Section::new("1B", vec!["lekcja 4: wf".into()]),
        ]
    }

    #[test]
    fn test_text_checksum_trims() {
        assert_eq!(checksum_text("  abc  "), checksum_text("abc"));
        assert_ne!(checksum_text("abc"), checksum_text("abd"));
    }

    #[test]
    fn test_section_order_independence() {
        let forward = sections();
        let mut reversed = sections();
        reversed.reverse();

        let mut shuffled_entries = sections();
        shuffled_entries[0].entries.reverse();

        let digest = checksum_sections(&forward);
        assert_eq!(checksum_sections(&reversed), digest);
        assert_eq!(checksum_sections(&shuffled_entries), digest);
    }

    #[test]
    fn test_sensitivity() {
        let original = sections();
        let mut title_changed = sections();
        title_changed[0].title = "3B".into();
        let mut entry_changed = sections();
        entry_changed[1].entries[0] = "lekcja 4: wg".into();

        let digest = checksum_sections(&original);
        assert_ne!(checksum_sections(&title_changed), digest);
        assert_ne!(checksum_sections(&entry_changed), digest);
    }

    #[test]
    fn test_empty_collection_is_stable() {
        assert_eq!(checksum_sections(&[]), checksum_sections(&[]));
        assert_ne!(checksum_sections(&[]), checksum_sections(&sections()));
    }
}
