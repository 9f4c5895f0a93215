//! Query shape encoding
//!
//! A shape is the filter with its literals abstracted. Two encodings exist:
//! - `TypeOnly` replaces every literal with its type tag; used to order
//!   sibling predicates during normalization
//! - `Parameterized` replaces only parameterized literals with type-tagged
//!   placeholders and keeps the rest; used for plan cache keys
//!
//! `$type` arguments are never part of a shape.

use std::collections::BTreeSet;
use std::fmt::Write;

use super::expression::MatchExpression;
use crate::value::{CanonicalType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMode {
    TypeOnly,
    Parameterized,
}

/// Encode the shape of a filter.
pub fn encode_filter_shape(expr: &MatchExpression, mode: LiteralMode) -> String {
    let mut out = String::new();
    encode(expr, mode, &mut out);
    out
}

fn encode(expr: &MatchExpression, mode: LiteralMode, out: &mut String) {
    match expr {
        MatchExpression::And(children) => encode_list("$and", children, mode, out),
        MatchExpression::Or(children) => encode_list("$or", children, mode, out),
        MatchExpression::Nor(children) => encode_list("$nor", children, mode, out),
        MatchExpression::Not(child) => {
            out.push_str("{$not: ");
            encode(child, mode, out);
            out.push('}');
        }
        MatchExpression::Comparison {
            path,
            op,
            value,
            param,
        } => {
            let lit = scalar(value, param.is_some(), mode);
            leaf(path, op.name(), &lit, out);
        }
        MatchExpression::In {
            path,
            values,
            param,
        } => {
            let lit = if param.is_some() || mode == LiteralMode::TypeOnly {
                list_placeholder(values)
            } else {
                list_literal(values)
            };
            leaf(path, "$in", &lit, out);
        }
        MatchExpression::Regex {
            path,
            pattern,
            flags,
            param,
        } => {
            let lit = if param.is_some() || mode == LiteralMode::TypeOnly {
                "?regex".to_string()
            } else {
                format!("/{}/{}", pattern, flags)
            };
            leaf(path, "$regex", &lit, out);
        }
        MatchExpression::Exists { path } => leaf(path, "$exists", "true", out),
        MatchExpression::Type { path, .. } => leaf(path, "$type", "?", out),
        MatchExpression::Mod {
            path,
            divisor,
            remainder,
            params,
        } => {
            let lit = if params.is_some() || mode == LiteralMode::TypeOnly {
                "[?num, ?num]".to_string()
            } else {
                format!("[{}, {}]", divisor, remainder)
            };
            leaf(path, "$mod", &lit, out);
        }
        MatchExpression::ElemMatchValue { path, children } => {
            let mut inner = String::new();
            encode_items(children, mode, &mut inner);
            leaf(path, "$elemMatch", &format!("[{}]", inner), out);
        }
        MatchExpression::ElemMatchObject { path, child } => {
            let mut inner = String::new();
            encode(child, mode, &mut inner);
            leaf(path, "$elemMatch", &inner, out);
        }
        MatchExpression::InternalExpr { path, op, value } => {
            let lit = scalar(value, false, mode);
            leaf(path, op.internal_expr_name(), &lit, out);
        }
        MatchExpression::AlwaysFalse => out.push_str("{$alwaysFalse: 1}"),
        MatchExpression::AlwaysTrue => out.push_str("{$alwaysTrue: 1}"),
    }
}

fn encode_list(op: &str, children: &[MatchExpression], mode: LiteralMode, out: &mut String) {
    let _ = write!(out, "{{{}: [", op);
    encode_items(children, mode, out);
    out.push_str("]}");
}

fn encode_items(children: &[MatchExpression], mode: LiteralMode, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        encode(child, mode, out);
    }
}

fn leaf(path: &str, op: &str, literal: &str, out: &mut String) {
    if path.is_empty() {
        let _ = write!(out, "{{{}: {}}}", op, literal);
    } else {
        let _ = write!(out, "{{{}: {{{}: {}}}}}", path, op, literal);
    }
}

fn scalar(value: &Value, parameterized: bool, mode: LiteralMode) -> String {
    if parameterized || mode == LiteralMode::TypeOnly {
        format!("?{}", value.canonical_type().tag())
    } else {
        value.to_string()
    }
}

fn list_placeholder(values: &[Value]) -> String {
    let tags: BTreeSet<CanonicalType> = values.iter().map(Value::canonical_type).collect();
    let tags: Vec<&str> = tags.iter().map(CanonicalType::tag).collect();
    format!("?[{}]", tags.join(","))
}

fn list_literal(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ComparisonOp;

    fn lt(path: &str, value: Value, param: Option<usize>) -> MatchExpression {
        MatchExpression::Comparison {
            path: path.into(),
            op: ComparisonOp::Lt,
            value,
            param,
        }
    }

    #[test]
    fn test_parameterized_literal_is_placeholder() {
        let expr = lt("a", Value::Int(5), Some(0));
        assert_eq!(
            encode_filter_shape(&expr, LiteralMode::Parameterized),
            "{a: {$lt: ?num}}"
        );
    }

    #[test]
    fn test_unparameterized_literal_is_kept() {
        let expr = lt("a", Value::MaxKey, None);
        assert_eq!(
            encode_filter_shape(&expr, LiteralMode::Parameterized),
            "{a: {$lt: MaxKey}}"
        );
        assert_eq!(
            encode_filter_shape(&expr, LiteralMode::TypeOnly),
            "{a: {$lt: ?maxkey}}"
        );
    }

    #[test]
    fn test_in_placeholder_lists_element_types() {
        let expr = MatchExpression::In {
            path: "a".into(),
            values: vec![Value::string("x"), Value::Int(1), Value::Int(2)],
            param: Some(0),
        };
        assert_eq!(
            encode_filter_shape(&expr, LiteralMode::Parameterized),
            "{a: {$in: ?[num,str]}}"
        );
    }

    #[test]
    fn test_elem_match_children_have_no_path() {
        let expr = MatchExpression::ElemMatchValue {
            path: "a".into(),
            children: vec![lt("", Value::Int(10), Some(0))],
        };
        assert_eq!(
            encode_filter_shape(&expr, LiteralMode::Parameterized),
            "{a: {$elemMatch: [{$lt: ?num}]}}"
        );
    }
}
