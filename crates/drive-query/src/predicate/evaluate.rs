//! Reference evaluation of predicates against records.
//!
//! Remote stores evaluate predicates themselves; this is what the in-memory
//! store and tests use so both agree on what a predicate means.

use super::node::{CombinatorKind, Comparison, ComparisonOperator, PredicateNode};
use crate::types::{Literal, Record};

impl PredicateNode {
    /// Evaluates the predicate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        evaluate_predicate(self, record)
    }
}

pub fn evaluate_predicate(node: &PredicateNode, record: &Record) -> bool {
    match node {
        PredicateNode::Comparison(comparison) => evaluate_comparison(comparison, record),
        PredicateNode::Not(child) => !evaluate_predicate(child, record),
        PredicateNode::Combinator(combinator) => match combinator.kind() {
            CombinatorKind::And => combinator
                .children()
                .iter()
                .all(|child| evaluate_predicate(child, record)),
            CombinatorKind::Or => combinator
                .children()
                .iter()
                .any(|child| evaluate_predicate(child, record)),
        },
        PredicateNode::Special(kind) => record.has_flag(*kind),
    }
}

fn evaluate_comparison(comparison: &Comparison, record: &Record) -> bool {
    // A record without the field never satisfies a comparison.
    let Some(value) = record.value(comparison.field().name()) else {
        return false;
    };
    let literal = comparison.literal();
    match comparison.operator() {
        ComparisonOperator::Eq => value == literal,
        ComparisonOperator::Contains => match (value, literal) {
            (Literal::String(haystack), Literal::String(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        ComparisonOperator::LessThan => compare_timestamps(value, literal, |a, b| a < b),
        ComparisonOperator::LessThanOrEqual => compare_timestamps(value, literal, |a, b| a <= b),
        ComparisonOperator::GreaterThan => compare_timestamps(value, literal, |a, b| a > b),
        ComparisonOperator::GreaterThanOrEqual => {
            compare_timestamps(value, literal, |a, b| a >= b)
        }
    }
}

fn compare_timestamps<F>(value: &Literal, literal: &Literal, cmp: F) -> bool
where
    F: Fn(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) -> bool,
{
    match (value.as_timestamp(), literal.as_timestamp()) {
        (Some(value), Some(literal)) => cmp(value, literal),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldRegistry, MIME_TYPE, MODIFIED_TIME, STARRED, TITLE};
    use crate::predicate::{Filters, SpecialKind};
    use chrono::{TimeZone, Utc};

    fn html(id: &str) -> Record {
        Record::new(id)
            .with(TITLE, format!("{id}.html"))
            .with(MIME_TYPE, "text/html")
    }

    fn plain(id: &str) -> Record {
        Record::new(id)
            .with(TITLE, format!("{id}.txt"))
            .with(MIME_TYPE, "text/plain")
            .with(STARRED, true)
    }

    #[test]
    fn negated_equality_excludes_matching_records() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let node = filters.not(filters.eq(MIME_TYPE, "text/plain").unwrap());

        assert!(node.matches(&html("a")));
        assert!(!node.matches(&plain("b")));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let node = filters.contains(TITLE, "A").unwrap();

        assert!(node.matches(&Record::new("1").with(TITLE, "Banana")));
        assert!(!node.matches(&Record::new("2").with(TITLE, "kiwi")));
    }

    #[test]
    fn missing_field_never_matches() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let node = filters.eq(STARRED, false).unwrap();

        assert!(!node.matches(&html("a")));
        assert!(filters.not(node).matches(&html("a")));
    }

    #[test]
    fn timestamp_ordering() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let cutoff = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let early = Record::new("early")
            .with(MODIFIED_TIME, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let exact = Record::new("exact").with(MODIFIED_TIME, cutoff);

        let before = filters.less_than(MODIFIED_TIME, cutoff).unwrap();
        let not_after = filters.less_than_or_equal(MODIFIED_TIME, cutoff).unwrap();
        let after = filters.greater_than(MODIFIED_TIME, cutoff).unwrap();
        let from = filters.greater_than_or_equal(MODIFIED_TIME, cutoff).unwrap();

        assert!(before.matches(&early));
        assert!(!before.matches(&exact));
        assert!(not_after.matches(&exact));
        assert!(!after.matches(&exact));
        assert!(from.matches(&exact));
        assert!(!from.matches(&early));
    }

    #[test]
    fn combinator_child_order_does_not_change_result() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let a = filters.eq(MIME_TYPE, "text/plain").unwrap();
        let b = filters.eq(STARRED, true).unwrap();
        let c = filters.contains(TITLE, "x").unwrap();
        let records = [html("x1"), plain("x2"), plain("y3"), html("y4")];

        let and_forward = filters.and([a.clone(), b.clone(), c.clone()]).unwrap();
        let and_reversed = filters.and([c.clone(), b.clone(), a.clone()]).unwrap();
        let or_forward = filters.or([a.clone(), b.clone(), c.clone()]).unwrap();
        let or_reversed = filters.or([b, c, a]).unwrap();

        for record in &records {
            assert_eq!(and_forward.matches(record), and_reversed.matches(record));
            assert_eq!(or_forward.matches(record), or_reversed.matches(record));
        }
    }

    #[test]
    fn single_child_combinator_matches_like_child() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let child = filters.eq(MIME_TYPE, "text/html").unwrap();
        let wrapped = filters.or([child.clone()]).unwrap();

        for record in [html("a"), plain("b")] {
            assert_eq!(child.matches(&record), wrapped.matches(&record));
        }
    }

    #[test]
    fn special_predicate_reads_record_flags() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let node = filters.shared_with_me();

        assert!(node.matches(&html("a").with_flag(SpecialKind::SharedWithMe)));
        assert!(!node.matches(&html("b").with_flag(SpecialKind::OwnedByMe)));
    }
}
