//! Filter predicates over remote file metadata.
//!
//! This module provides:
//! - Predicate node types (comparison, NOT, AND/OR, special predicates)
//! - Validating constructors bound to a field registry
//! - Reference evaluation against records
//! - Normalization (flattening, single-child unwrapping)

mod evaluate;
mod filters;
mod node;
mod normalize;

pub use evaluate::evaluate_predicate;
pub use filters::Filters;
pub use node::{
    Combinator, CombinatorKind, Comparison, ComparisonOperator, PredicateNode, SpecialKind,
};
pub use normalize::normalize;

pub(crate) use filters::combine;
