//! Predicates deciding whether a section satisfies a [`Query`].

use crate::ini::document::{Node, Section};
use crate::query::{Pattern, Query, WherePair};

pub fn match_value(pattern: &Pattern, value: &str) -> bool {
    pattern.matches(value)
}

/// Number of `patterns` matching `value`.
pub fn match_any(patterns: &[Pattern], value: &str) -> usize {
    patterns
        .iter()
        .filter(|pattern| match_value(pattern, value))
        .count()
}

fn slot_matches(slot: &Option<Pattern>, candidate: &str) -> bool {
    slot.as_ref()
        .map_or(true, |pattern| match_value(pattern, candidate))
}

/// Number of matching key/value slots across all pairs (two per pair).
pub fn match_pairs(pairs: &[WherePair], key: &str, value: &str) -> usize {
    pairs
        .iter()
        .map(|(key_slot, value_slot)| {
            usize::from(slot_matches(key_slot, key)) + usize::from(slot_matches(value_slot, value))
        })
        .sum()
}

/// Number of pairs whose key and value slots both match.
pub fn satisfied_pairs(pairs: &[WherePair], key: &str, value: &str) -> usize {
    pairs
        .iter()
        .filter(|(key_slot, value_slot)| {
            slot_matches(key_slot, key) && slot_matches(value_slot, value)
        })
        .count()
}

/// Whether `section` is selected by `query`. The preamble never is.
pub fn section_matches(query: &Query, section: &Section) -> bool {
    if section.is_preamble() {
        return false;
    }

    let names = query.section_patterns();
    if !names.is_empty() && match_any(names, &section.name) == 0 {
        return false;
    }

    let pairs = query.where_pairs();
    let comments = query.comment_patterns();
    let mut satisfied = 0;

    for node in &section.nodes {
        match node {
            Node::Property(property) if !pairs.is_empty() => {
                satisfied += satisfied_pairs(pairs, &property.key, &property.value);
            }
            Node::Comment(comment) if !comments.is_empty() => {
                satisfied += match_any(comments, comment.trimmed());
            }
            _ => {}
        }
    }

    satisfied >= query.required()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ini::parser::parse;

    fn pair(key: Option<&str>, value: Option<&str>) -> WherePair {
        (key.map(Pattern::literal), value.map(Pattern::literal))
    }

    #[test]
    fn match_any_counts_every_hit() {
        let patterns = vec![
            Pattern::literal("abc"),
            Pattern::regex("^a").unwrap(),
            Pattern::literal("zzz"),
        ];
        assert_eq!(match_any(&patterns, "abc"), 2);
        assert_eq!(match_any(&patterns, "qqq"), 0);
    }

    #[test]
    fn wildcard_slots_always_match() {
        let pairs = vec![pair(None, Some("1"))];
        assert_eq!(match_pairs(&pairs, "anything", "1"), 2);
        assert_eq!(match_pairs(&pairs, "anything", "2"), 1);
        assert_eq!(satisfied_pairs(&pairs, "anything", "2"), 0);
    }

    #[test]
    fn satisfaction_needs_both_slots_of_one_pair() {
        // A=2 hits the key of the first pair and the value of the second:
        // two slots, zero satisfied pairs.
        let pairs = vec![pair(Some("A"), Some("1")), pair(Some("B"), Some("2"))];
        assert_eq!(match_pairs(&pairs, "A", "2"), 2);
        assert_eq!(satisfied_pairs(&pairs, "A", "2"), 0);
        assert_eq!(satisfied_pairs(&pairs, "B", "2"), 1);
    }

    #[test]
    fn crossed_slots_do_not_satisfy_a_section() {
        let document = parse("[S]\nA = 2\nB = 1\n").unwrap();
        let query = Query::default()
            .with_where(Some("A".into()), Some("1".into()))
            .with_where(Some("B".into()), Some("2".into()));
        assert!(!section_matches(&query, &document.sections()[0]));
    }

    #[test]
    fn empty_query_matches_named_sections_only() {
        let document = parse("top = 1\n[A]\n").unwrap();
        let query = Query::default();
        assert!(!section_matches(&query, &document.sections()[0]));
        assert!(section_matches(&query, &document.sections()[1]));
    }

    #[test]
    fn section_names_are_a_prefilter() {
        let document = parse("[A]\nX = 1\n[B]\nX = 1\n").unwrap();
        let query = Query::for_sections(["B"]).with_where(Some("X".into()), Some("1".into()));
        assert!(!section_matches(&query, &document.sections()[0]));
        assert!(section_matches(&query, &document.sections()[1]));
    }

    #[test]
    fn comments_are_matched_trimmed() {
        let document = parse("[A]\n#   keep me   \nX = 1\n").unwrap();
        let hit = Query::default().with_comment("keep me");
        let miss = Query::default().with_comment("keep");
        let regex = Query::default().with_comment(Pattern::regex("^keep").unwrap());
        let section = &document.sections()[0];
        assert!(section_matches(&hit, section));
        assert!(!section_matches(&miss, section));
        assert!(section_matches(&regex, section));
    }

    #[test]
    fn every_where_pair_must_be_satisfied() {
        let document = parse("[A]\nX = 1\nY = 2\n[B]\nX = 1\n").unwrap();
        let query = Query::default()
            .with_where(Some("X".into()), Some("1".into()))
            .with_where(Some("Y".into()), Some(Pattern::regex("^\\d$").unwrap()));
        assert!(section_matches(&query, &document.sections()[0]));
        assert!(!section_matches(&query, &document.sections()[1]));
    }
}
