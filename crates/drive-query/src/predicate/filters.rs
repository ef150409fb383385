//! Validating predicate constructors.

use std::sync::Arc;

use super::node::{
    Combinator, CombinatorKind, Comparison, ComparisonOperator, PredicateNode, SpecialKind,
};
use crate::error::{DriveQueryError, Result};
use crate::field::FieldRegistry;
use crate::types::Literal;

/// Builds predicate nodes against a field registry.
///
/// Every comparison is checked here: the field must exist, the operator must
/// apply to the field's value type and the literal must have that type.
#[derive(Debug, Clone, Copy)]
pub struct Filters<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> Filters<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a FieldRegistry {
        self.registry
    }

    pub fn eq(&self, field: &str, literal: impl Into<Literal>) -> Result<PredicateNode> {
        self.compare(field, ComparisonOperator::Eq, literal.into())
    }

    /// Substring match, valid only for string fields.
    pub fn contains(&self, field: &str, substring: impl Into<String>) -> Result<PredicateNode> {
        self.compare(
            field,
            ComparisonOperator::Contains,
            Literal::String(substring.into()),
        )
    }

    pub fn less_than(&self, field: &str, literal: impl Into<Literal>) -> Result<PredicateNode> {
        self.compare(field, ComparisonOperator::LessThan, literal.into())
    }

    pub fn less_than_or_equal(
        &self,
        field: &str,
        literal: impl Into<Literal>,
    ) -> Result<PredicateNode> {
        self.compare(field, ComparisonOperator::LessThanOrEqual, literal.into())
    }

    pub fn greater_than(&self, field: &str, literal: impl Into<Literal>) -> Result<PredicateNode> {
        self.compare(field, ComparisonOperator::GreaterThan, literal.into())
    }

    pub fn greater_than_or_equal(
        &self,
        field: &str,
        literal: impl Into<Literal>,
    ) -> Result<PredicateNode> {
        self.compare(field, ComparisonOperator::GreaterThanOrEqual, literal.into())
    }

    pub fn compare(
        &self,
        field: &str,
        operator: ComparisonOperator,
        literal: Literal,
    ) -> Result<PredicateNode> {
        let field = self.registry.lookup(field)?;
        if !operator.accepts(field.value_type()) {
            return Err(DriveQueryError::UnsupportedOperator {
                field: field.name().to_string(),
                operator,
                value_type: field.value_type(),
            });
        }
        if literal.value_type() != field.value_type() {
            return Err(DriveQueryError::TypeMismatch {
                field: field.name().to_string(),
                expected: field.value_type(),
                actual: literal.value_type(),
            });
        }
        Ok(PredicateNode::Comparison(Comparison::new(
            field.clone(),
            operator,
            literal,
        )))
    }

    pub fn not(&self, node: PredicateNode) -> PredicateNode {
        PredicateNode::Not(Arc::new(node))
    }

    pub fn and(&self, children: impl IntoIterator<Item = PredicateNode>) -> Result<PredicateNode> {
        combine(CombinatorKind::And, children)
    }

    pub fn or(&self, children: impl IntoIterator<Item = PredicateNode>) -> Result<PredicateNode> {
        combine(CombinatorKind::Or, children)
    }

    pub fn special(&self, kind: SpecialKind) -> PredicateNode {
        PredicateNode::Special(kind)
    }

    pub fn shared_with_me(&self) -> PredicateNode {
        self.special(SpecialKind::SharedWithMe)
    }

    pub fn owned_by_me(&self) -> PredicateNode {
        self.special(SpecialKind::OwnedByMe)
    }

    pub fn opened_by_me(&self) -> PredicateNode {
        self.special(SpecialKind::OpenedByMe)
    }
}

pub(crate) fn combine(
    kind: CombinatorKind,
    children: impl IntoIterator<Item = PredicateNode>,
) -> Result<PredicateNode> {
    let children = children.into_iter().collect::<Vec<_>>();
    if children.is_empty() {
        return Err(DriveQueryError::EmptyCombinator(kind.as_str()));
    }
    Ok(PredicateNode::Combinator(Combinator::new(kind, children)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ValueType, MIME_TYPE, MODIFIED_TIME, STARRED, TITLE};
    use chrono::{TimeZone, Utc};

    #[test]
    fn eq_accepts_literal_of_declared_type() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert!(filters.eq(MIME_TYPE, "text/plain").is_ok());
        assert!(filters.eq(STARRED, true).is_ok());
        assert!(filters.eq(MODIFIED_TIME, at).is_ok());
    }

    #[test]
    fn eq_rejects_mismatched_literal() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        let error = filters.eq(STARRED, "yes").unwrap_err();
        assert!(matches!(
            error,
            DriveQueryError::TypeMismatch {
                expected: ValueType::Boolean,
                actual: ValueType::String,
                ..
            }
        ));
        assert!(matches!(
            filters.eq(TITLE, false),
            Err(DriveQueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn contains_requires_string_field() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        assert!(filters.contains(TITLE, "a").is_ok());
        let error = filters.contains(STARRED, "a").unwrap_err();
        assert!(matches!(
            error,
            DriveQueryError::UnsupportedOperator {
                operator: ComparisonOperator::Contains,
                ..
            }
        ));
    }

    #[test]
    fn ordering_requires_timestamp_field() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert!(filters.greater_than(MODIFIED_TIME, at).is_ok());
        assert!(filters.less_than_or_equal(MODIFIED_TIME, at).is_ok());
        assert!(matches!(
            filters.less_than(TITLE, "m"),
            Err(DriveQueryError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            filters.greater_than_or_equal(MODIFIED_TIME, "yesterday"),
            Err(DriveQueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unknown_field_fails_before_type_checks() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        assert!(matches!(
            filters.eq("owner", "me"),
            Err(DriveQueryError::UnknownField(_))
        ));
    }

    #[test]
    fn empty_combinators_fail() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        assert!(matches!(
            filters.and(Vec::new()),
            Err(DriveQueryError::EmptyCombinator("and"))
        ));
        assert!(matches!(
            filters.or(Vec::new()),
            Err(DriveQueryError::EmptyCombinator("or"))
        ));
    }

    #[test]
    fn single_child_combinator_is_permitted() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        let node = filters.and([filters.shared_with_me()]).expect("and");
        match node {
            PredicateNode::Combinator(combinator) => {
                assert_eq!(combinator.kind(), CombinatorKind::And);
                assert_eq!(combinator.children().len(), 1);
            }
            _ => panic!("Expected Combinator"),
        }
    }

    #[test]
    fn displays_drive_query_syntax() {
        let registry = FieldRegistry::default();
        let filters = Filters::new(&registry);

        let node = filters
            .or([
                filters.not(filters.eq(MIME_TYPE, "text/plain").unwrap()),
                filters
                    .and([
                        filters.contains(TITLE, "a").unwrap(),
                        filters.eq(STARRED, true).unwrap(),
                    ])
                    .unwrap(),
                filters.shared_with_me(),
            ])
            .unwrap();

        assert_eq!(
            node.to_string(),
            "not (mimeType = 'text/plain') or (title contains 'a' and starred = true) or sharedWithMe"
        );
        assert_eq!(node.node_count(), 7);
    }
}
