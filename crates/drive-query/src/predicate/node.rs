//! Predicate tree node types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::field::{Field, ValueType};
use crate::types::Literal;

/// An immutable filter predicate (AST node).
///
/// Subtrees are reference counted, so cloning a node and reusing it inside
/// several queries shares the underlying structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateNode {
    Comparison(Comparison),
    Not(Arc<PredicateNode>),
    Combinator(Combinator),
    Special(SpecialKind),
}

/// Comparison operator of a [`Comparison`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Contains,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Contains => "contains",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Returns whether the operator can be applied to a field of `value_type`.
    pub fn accepts(self, value_type: ValueType) -> bool {
        match self {
            Self::Eq => true,
            Self::Contains => value_type == ValueType::String,
            Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual => value_type.is_ordered(),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `field operator literal` leaf.
///
/// Only the `Filters` constructors build comparisons, so the literal type is
/// always the field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    field: Field,
    operator: ComparisonOperator,
    literal: Literal,
}

impl Comparison {
    pub(crate) fn new(field: Field, operator: ComparisonOperator, literal: Literal) -> Self {
        Self {
            field,
            operator,
            literal,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    And,
    Or,
}

impl CombinatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// A boolean AND/OR over a non-empty ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinator {
    kind: CombinatorKind,
    children: Arc<[PredicateNode]>,
}

impl Combinator {
    /// Callers guarantee `children` is non-empty.
    pub(crate) fn new(kind: CombinatorKind, children: Vec<PredicateNode>) -> Self {
        debug_assert!(!children.is_empty());
        Self {
            kind,
            children: children.into(),
        }
    }

    pub fn kind(&self) -> CombinatorKind {
        self.kind
    }

    pub fn children(&self) -> &[PredicateNode] {
        &self.children
    }
}

/// Zero-ary predicates evaluated by the store against the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialKind {
    SharedWithMe,
    OwnedByMe,
    OpenedByMe,
}

impl SpecialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SharedWithMe => "sharedWithMe",
            Self::OwnedByMe => "ownedByMe",
            Self::OpenedByMe => "openedByMe",
        }
    }
}

impl PredicateNode {
    /// Number of nodes in the tree, including this one.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Comparison(_) | Self::Special(_) => 1,
            Self::Not(child) => 1 + child.node_count(),
            Self::Combinator(combinator) => {
                1 + combinator
                    .children()
                    .iter()
                    .map(PredicateNode::node_count)
                    .sum::<usize>()
            }
        }
    }
}

impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(comparison) => write!(
                f,
                "{} {} {}",
                comparison.field.name(),
                comparison.operator,
                comparison.literal
            ),
            Self::Not(child) => write!(f, "not ({child})"),
            Self::Combinator(combinator) => {
                for (position, child) in combinator.children().iter().enumerate() {
                    if position > 0 {
                        write!(f, " {} ", combinator.kind.as_str())?;
                    }
                    match child {
                        Self::Combinator(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Self::Special(kind) => f.write_str(kind.as_str()),
        }
    }
}
