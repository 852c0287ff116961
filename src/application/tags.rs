// src/application/tags.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local};

/// Tags stamped on every note of a run: the year and the two-digit month.
pub fn time_tags(now: DateTime<Local>) -> Vec<String> {
    vec![
        format!("Year::{}", now.year()),
        format!("Month::{:02}", now.month()),
    ]
}

/// Union of source tags, batch tags, and the generated time tags.
///
/// De-duplication is case-insensitive; the first casing seen wins.
/// Hierarchical `Parent::Child` strings pass through verbatim. The output
/// order is deterministic, so assembling the same inputs in any order yields
/// the same set.
pub fn assemble_tags(
    source_tags: &[String],
    batch_tags: &[String],
    now: DateTime<Local>,
) -> Vec<String> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let generated = time_tags(now);

    for tag in source_tags.iter().chain(batch_tags).chain(generated.iter()) {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        seen.entry(tag.to_lowercase()).or_insert_with(|| tag.to_string());
    }

    seen.into_values().collect()
}

/// Case-insensitive union of two tag lists, same ordering rules as
/// [`assemble_tags`]. Used when touching an existing note.
pub fn union(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for tag in existing.iter().chain(incoming) {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        seen.entry(tag.to_lowercase()).or_insert_with(|| tag.to_string());
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn run_date() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn given_source_and_batch_tags_when_assembling_then_union_includes_time_tags() {
        let source = vec!["Check".to_string()];
        let batch = vec!["Topic::Tech".to_string()];

        let tags = assemble_tags(&source, &batch, run_date());

        let expected: BTreeSet<&str> =
            ["Check", "Topic::Tech", "Year::2026", "Month::03"].into_iter().collect();
        let actual: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn given_duplicate_casing_when_assembling_then_deduplicates_case_insensitively() {
        let source = vec!["check".to_string(), "Check".to_string()];
        let batch = vec!["CHECK".to_string()];

        let tags = assemble_tags(&source, &batch, run_date());

        assert_eq!(tags.iter().filter(|t| t.eq_ignore_ascii_case("check")).count(), 1);
    }

    #[test]
    fn given_same_inputs_when_assembling_twice_then_idempotent() {
        let source = vec!["A".to_string(), "B::C".to_string()];
        let batch = vec!["d".to_string()];

        let first = assemble_tags(&source, &batch, run_date());
        let second = assemble_tags(&first, &batch, run_date());

        assert_eq!(first, second);
    }

    #[test]
    fn given_swapped_inputs_when_assembling_then_commutative_as_set() {
        let a = vec!["Alpha".to_string()];
        let b = vec!["Beta".to_string()];

        let one: BTreeSet<String> = assemble_tags(&a, &b, run_date()).into_iter().collect();
        let two: BTreeSet<String> = assemble_tags(&b, &a, run_date()).into_iter().collect();

        assert_eq!(one, two);
    }

    #[test]
    fn given_hierarchical_tags_when_assembling_then_passed_through_verbatim() {
        let source = vec!["Topic::Deep::Nesting".to_string()];

        let tags = assemble_tags(&source, &[], run_date());

        assert!(tags.contains(&"Topic::Deep::Nesting".to_string()));
    }

    #[test]
    fn given_blank_tags_when_assembling_then_dropped() {
        let source = vec!["  ".to_string(), "".to_string(), "Real".to_string()];

        let tags = assemble_tags(&source, &[], run_date());

        assert!(tags.contains(&"Real".to_string()));
        assert!(!tags.iter().any(|t| t.trim().is_empty()));
    }

    #[test]
    fn given_overlapping_lists_when_taking_union_then_each_tag_once() {
        let existing = vec!["Kept".to_string(), "Shared".to_string()];
        let incoming = vec!["shared".to_string(), "New".to_string()];

        let merged = union(&existing, &incoming);

        assert_eq!(merged.len(), 3);
        assert!(merged.contains(&"Kept".to_string()));
        assert!(merged.contains(&"Shared".to_string()));
        assert!(merged.contains(&"New".to_string()));
    }
}
