//! Filter normalization
//!
//! Rewrites a parsed filter into a canonical form so that filters which
//! differ only in predicate order or nesting have the same shape:
//! - nested `$and` inside `$and` (and `$or` inside `$or`) is flattened
//! - single-child `$and`/`$or` is replaced by its child
//! - children of logical nodes are stably sorted by match type, then path,
//!   then literal-free shape
//!
//! `$elemMatch` children keep their written order.

use std::cmp::Ordering;

use super::expression::MatchExpression;
use super::shape::{encode_filter_shape, LiteralMode};

pub fn normalize(expr: MatchExpression) -> MatchExpression {
    match expr {
        MatchExpression::And(children) => {
            let children = flatten(children, |e| match e {
                MatchExpression::And(inner) => Ok(inner),
                other => Err(other),
            });
            collapse(children, MatchExpression::And)
        }
        MatchExpression::Or(children) => {
            let children = flatten(children, |e| match e {
                MatchExpression::Or(inner) => Ok(inner),
                other => Err(other),
            });
            collapse(children, MatchExpression::Or)
        }
        MatchExpression::Nor(children) => {
            let mut children: Vec<MatchExpression> = children.into_iter().map(normalize).collect();
            sort_children(&mut children);
            MatchExpression::Nor(children)
        }
        MatchExpression::Not(child) => MatchExpression::Not(Box::new(normalize(*child))),
        MatchExpression::ElemMatchValue { path, children } => MatchExpression::ElemMatchValue {
            path,
            children: children.into_iter().map(normalize).collect(),
        },
        MatchExpression::ElemMatchObject { path, child } => MatchExpression::ElemMatchObject {
            path,
            child: Box::new(normalize(*child)),
        },
        leaf => leaf,
    }
}

/// Normalize children, splicing in the children of same-kind nodes.
fn flatten(
    children: Vec<MatchExpression>,
    same_kind: impl Fn(MatchExpression) -> Result<Vec<MatchExpression>, MatchExpression> + Copy,
) -> Vec<MatchExpression> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match same_kind(normalize(child)) {
            Ok(inner) => out.extend(inner),
            Err(other) => out.push(other),
        }
    }
    out
}

fn collapse(
    mut children: Vec<MatchExpression>,
    wrap: fn(Vec<MatchExpression>) -> MatchExpression,
) -> MatchExpression {
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return only;
        }
    }
    sort_children(&mut children);
    wrap(children)
}

fn sort_children(children: &mut [MatchExpression]) {
    children.sort_by(compare_for_sort);
}

fn compare_for_sort(a: &MatchExpression, b: &MatchExpression) -> Ordering {
    a.match_type()
        .cmp(&b.match_type())
        .then_with(|| a.path().cmp(&b.path()))
        .then_with(|| {
            encode_filter_shape(a, LiteralMode::TypeOnly)
                .cmp(&encode_filter_shape(b, LiteralMode::TypeOnly))
        })
}
