//! Executable query values and their builder.

use std::fmt;

use crate::predicate::{combine, CombinatorKind, PredicateNode};
use crate::types::Record;

/// An immutable query: one root predicate, or none to match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    root: Option<PredicateNode>,
}

impl Query {
    pub fn new(root: Option<PredicateNode>) -> Self {
        Self { root }
    }

    /// A query matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    pub fn root(&self) -> Option<&PredicateNode> {
        self.root.as_ref()
    }

    pub fn matches_all(&self) -> bool {
        self.root.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.root.as_ref().map_or(true, |root| root.matches(record))
    }
}

impl From<PredicateNode> for Query {
    fn from(root: PredicateNode) -> Self {
        Self::new(Some(root))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => f.write_str("*"),
        }
    }
}

/// Accumulates filters that are ANDed together in the order added.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filters: Vec<PredicateNode>,
}

impl QueryBuilder {
    pub fn add_filter(mut self, filter: PredicateNode) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Folds the accumulated filters into a query.
    ///
    /// No filters yields a match-all query, one filter becomes the root as is,
    /// and several are wrapped in a single AND in insertion order.
    pub fn build(mut self) -> Query {
        let root = match self.filters.len() {
            0 => None,
            1 => self.filters.pop(),
            _ => combine(CombinatorKind::And, self.filters).ok(),
        };
        Query { root }
    }
}
