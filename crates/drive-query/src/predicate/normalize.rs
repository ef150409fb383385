//! Semantics-preserving rewrites of predicate trees.
//!
//! - Flattens nested AND/AND and OR/OR combinators
//! - Unwraps single-child combinators
//! - Removes double negation
//!
//! Child order is preserved. Construction never normalizes implicitly, so
//! structural equality of built queries reflects exactly what was built.

use std::sync::Arc;

use super::node::{Combinator, CombinatorKind, PredicateNode};

/// Returns the normalized form of `node`. The input is not modified.
pub fn normalize(node: &PredicateNode) -> PredicateNode {
    match node {
        PredicateNode::Combinator(combinator) => {
            normalize_combinator(combinator.kind(), combinator.children())
        }
        PredicateNode::Not(child) => match normalize(child) {
            PredicateNode::Not(inner) => (*inner).clone(),
            other => PredicateNode::Not(Arc::new(other)),
        },
        PredicateNode::Comparison(_) | PredicateNode::Special(_) => node.clone(),
    }
}

fn normalize_combinator(kind: CombinatorKind, children: &[PredicateNode]) -> PredicateNode {
    let mut flattened = Vec::with_capacity(children.len());

    for child in children.iter().map(normalize) {
        match child {
            // Flatten nested combinators of the same kind
            PredicateNode::Combinator(nested) if nested.kind() == kind => {
                flattened.extend(nested.children().iter().cloned())
            }
            other => flattened.push(other),
        }
    }

    if flattened.len() == 1 {
        if let Some(only) = flattened.pop() {
            return only;
        }
    }
    PredicateNode::Combinator(Combinator::new(kind, flattened))
}
