//! Filter document parser
//!
//! Turns a JSON filter into a `MatchExpression`. The result is not yet
//! normalized: callers go through `CanonicalQuery` or call `normalize`.
//!
//! Rewrites applied while parsing:
//! - `{a: 5}` becomes `$eq`, `{a: /re/}` becomes `$regex`
//! - `$ne` becomes `$not` over `$eq`, `$nin` becomes `$not` over `$in`
//! - `$exists: false` becomes `$not` over `$exists`
//! - several operators on one field become sibling predicates

use serde_json::{Map, Value as Json};

use super::errors::{QueryError, QueryResult};
use super::expression::{BsonTypeTag, ComparisonOp, MatchExpression};
use crate::value::{from_json, is_extended_literal, sorted_flags, Value};

const REGEX_FLAGS: &str = "imsux";

/// Parse a filter document.
pub fn parse_filter(filter: &Json) -> QueryResult<MatchExpression> {
    let obj = filter
        .as_object()
        .ok_or_else(|| QueryError::bad_value("filter must be an object"))?;
    parse_document(obj)
}

fn parse_document(obj: &Map<String, Json>) -> QueryResult<MatchExpression> {
    let mut children = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        if key.starts_with('$') {
            children.push(parse_top_level_operator(key, value)?);
        } else {
            children.extend(parse_field(key, value)?);
        }
    }
    Ok(MatchExpression::And(children))
}

fn parse_top_level_operator(op: &str, value: &Json) -> QueryResult<MatchExpression> {
    match op {
        "$and" | "$or" | "$nor" => {
            let items = value
                .as_array()
                .filter(|items| !items.is_empty())
                .ok_or_else(|| QueryError::bad_value(format!("{} must be a nonempty array", op)))?;
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                let doc = item.as_object().ok_or_else(|| {
                    QueryError::bad_value(format!("{} entries must be objects", op))
                })?;
                children.push(parse_document(doc)?);
            }
            Ok(match op {
                "$and" => MatchExpression::And(children),
                "$or" => MatchExpression::Or(children),
                _ => MatchExpression::Nor(children),
            })
        }
        "$alwaysFalse" | "$alwaysTrue" => {
            if value.as_f64() != Some(1.0) {
                return Err(QueryError::bad_value(format!("{} must be 1", op)));
            }
            Ok(if op == "$alwaysFalse" {
                MatchExpression::AlwaysFalse
            } else {
                MatchExpression::AlwaysTrue
            })
        }
        other => Err(QueryError::unknown_operator(other)),
    }
}

/// True if `value` is an operator document such as `{$lt: 5}`.
fn is_operator_document(value: &Json) -> Option<&Map<String, Json>> {
    let obj = value.as_object()?;
    if obj.is_empty() || is_extended_literal(obj) {
        return None;
    }
    let (first, _) = obj.iter().next()?;
    if first.starts_with('$') {
        Some(obj)
    } else {
        None
    }
}

fn parse_field(path: &str, value: &Json) -> QueryResult<Vec<MatchExpression>> {
    if let Some(ops) = is_operator_document(value) {
        return parse_operators(path, ops);
    }

    match from_json(value) {
        Value::Regex { pattern, flags } => Ok(vec![regex_expr(path, pattern, flags)?]),
        literal => Ok(vec![comparison(path, ComparisonOp::Eq, literal)?]),
    }
}

/// Parse the operators of one field.
fn parse_operators(path: &str, ops: &Map<String, Json>) -> QueryResult<Vec<MatchExpression>> {
    let mut out = Vec::with_capacity(ops.len());
    let mut regex: Option<(String, String)> = None;
    let mut options: Option<String> = None;

    for (op, arg) in ops {
        if !op.starts_with('$') {
            return Err(QueryError::bad_field_value(
                path,
                format!("cannot mix operators and field names ({})", op),
            ));
        }
        match op.as_str() {
            "$eq" => out.push(comparison(path, ComparisonOp::Eq, from_json(arg))?),
            "$lt" => out.push(comparison(path, ComparisonOp::Lt, from_json(arg))?),
            "$lte" => out.push(comparison(path, ComparisonOp::Lte, from_json(arg))?),
            "$gt" => out.push(comparison(path, ComparisonOp::Gt, from_json(arg))?),
            "$gte" => out.push(comparison(path, ComparisonOp::Gte, from_json(arg))?),
            "$ne" => out.push(MatchExpression::Not(Box::new(comparison(
                path,
                ComparisonOp::Eq,
                from_json(arg),
            )?))),
            "$in" => out.push(in_expr(path, arg)?),
            "$nin" => out.push(MatchExpression::Not(Box::new(in_expr(path, arg)?))),
            "$exists" => {
                let exists = MatchExpression::Exists {
                    path: path.to_string(),
                };
                if is_truthy(arg) {
                    out.push(exists);
                } else {
                    out.push(MatchExpression::Not(Box::new(exists)));
                }
            }
            "$type" => out.push(type_expr(path, arg)?),
            "$mod" => out.push(mod_expr(path, arg)?),
            "$regex" => {
                regex = Some(match from_json(arg) {
                    Value::String(pattern) => (pattern, String::new()),
                    Value::Regex { pattern, flags } => (pattern, flags),
                    _ => {
                        return Err(QueryError::bad_field_value(
                            path,
                            "$regex must be a string or regex",
                        ))
                    }
                });
            }
            "$options" => {
                let s = arg.as_str().ok_or_else(|| {
                    QueryError::bad_field_value(path, "$options must be a string")
                })?;
                options = Some(s.to_string());
            }
            "$not" => out.push(not_expr(path, arg)?),
            "$elemMatch" => out.push(elem_match_expr(path, arg)?),
            "$_internalExprEq" => out.push(internal_expr(path, ComparisonOp::Eq, arg)?),
            "$_internalExprLt" => out.push(internal_expr(path, ComparisonOp::Lt, arg)?),
            "$_internalExprLte" => out.push(internal_expr(path, ComparisonOp::Lte, arg)?),
            "$_internalExprGt" => out.push(internal_expr(path, ComparisonOp::Gt, arg)?),
            "$_internalExprGte" => out.push(internal_expr(path, ComparisonOp::Gte, arg)?),
            other => return Err(QueryError::unknown_operator(other)),
        }
    }

    match (regex, options) {
        (Some((pattern, flags)), options) => {
            let flags = options.unwrap_or(flags);
            out.push(regex_expr(path, pattern, flags)?);
        }
        (None, Some(_)) => {
            return Err(QueryError::bad_field_value(path, "$options needs a $regex"));
        }
        (None, None) => {}
    }

    Ok(out)
}

fn comparison(path: &str, op: ComparisonOp, value: Value) -> QueryResult<MatchExpression> {
    if matches!(value, Value::Undefined) {
        return Err(QueryError::bad_field_value(
            path,
            format!("cannot compare to undefined with {}", op.name()),
        ));
    }
    Ok(MatchExpression::Comparison {
        path: path.to_string(),
        op,
        value,
        param: None,
    })
}

fn in_expr(path: &str, arg: &Json) -> QueryResult<MatchExpression> {
    let items = arg
        .as_array()
        .ok_or_else(|| QueryError::bad_field_value(path, "$in needs an array"))?;

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        if is_operator_document(item).is_some() {
            return Err(QueryError::bad_field_value(path, "cannot nest $ under $in"));
        }
        let value = from_json(item);
        match &value {
            Value::Undefined => {
                return Err(QueryError::bad_field_value(path, "$in cannot contain undefined"))
            }
            Value::Regex { pattern, flags } => validate_regex(path, pattern, flags)?,
            _ => {}
        }
        values.push(value);
    }

    Ok(MatchExpression::In {
        path: path.to_string(),
        values,
        param: None,
    })
}

fn regex_expr(path: &str, pattern: String, flags: String) -> QueryResult<MatchExpression> {
    let flags = sorted_flags(&flags);
    validate_regex(path, &pattern, &flags)?;
    Ok(MatchExpression::Regex {
        path: path.to_string(),
        pattern,
        flags,
        param: None,
    })
}

/// Reject unknown flags and patterns that do not compile.
fn validate_regex(path: &str, pattern: &str, flags: &str) -> QueryResult<()> {
    if let Some(bad) = flags.chars().find(|c| !REGEX_FLAGS.contains(*c)) {
        return Err(QueryError::bad_regex(path, format!("invalid flag '{}'", bad)));
    }
    regex::RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map(|_| ())
        .map_err(|e| QueryError::bad_regex(path, e.to_string()))
}

fn type_expr(path: &str, arg: &Json) -> QueryResult<MatchExpression> {
    let args: Vec<&Json> = match arg {
        Json::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    let mut types = Vec::with_capacity(args.len());
    for a in args {
        let tag = match a {
            Json::String(alias) => BsonTypeTag::from_alias(alias)
                .ok_or_else(|| QueryError::bad_type(path, alias.as_str()))?,
            Json::Number(n) => {
                let code = n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
                    .ok_or_else(|| QueryError::bad_type(path, n.to_string()))?;
                BsonTypeTag::from_code(code).ok_or_else(|| QueryError::bad_type(path, n.to_string()))?
            }
            other => return Err(QueryError::bad_type(path, other.to_string())),
        };
        types.push(tag);
    }

    Ok(MatchExpression::Type {
        path: path.to_string(),
        types,
    })
}

fn mod_expr(path: &str, arg: &Json) -> QueryResult<MatchExpression> {
    let items = arg
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| QueryError::bad_field_value(path, "$mod needs [divisor, remainder]"))?;

    let mut nums = [0i64; 2];
    for (slot, item) in nums.iter_mut().zip(items) {
        *slot = match from_json(item) {
            Value::Int(i) => i,
            Value::Double(d) if d.is_finite() => d.trunc() as i64,
            _ => {
                return Err(QueryError::bad_field_value(
                    path,
                    "$mod arguments must be finite numbers",
                ))
            }
        };
    }
    if nums[0] == 0 {
        return Err(QueryError::bad_field_value(path, "$mod divisor cannot be 0"));
    }

    Ok(MatchExpression::Mod {
        path: path.to_string(),
        divisor: nums[0],
        remainder: nums[1],
        params: None,
    })
}

fn not_expr(path: &str, arg: &Json) -> QueryResult<MatchExpression> {
    if let Value::Regex { pattern, flags } = from_json(arg) {
        return Ok(MatchExpression::Not(Box::new(regex_expr(path, pattern, flags)?)));
    }

    let ops = is_operator_document(arg)
        .ok_or_else(|| QueryError::bad_field_value(path, "$not needs a regex or operator document"))?;
    let mut children = parse_operators(path, ops)?;
    let child = if children.len() == 1 {
        children.remove(0)
    } else {
        MatchExpression::And(children)
    };
    Ok(MatchExpression::Not(Box::new(child)))
}

fn elem_match_expr(path: &str, arg: &Json) -> QueryResult<MatchExpression> {
    let obj = arg
        .as_object()
        .ok_or_else(|| QueryError::bad_field_value(path, "$elemMatch needs an object"))?;

    let value_form = match obj.keys().next() {
        Some(first) => {
            first.starts_with('$') && !matches!(first.as_str(), "$and" | "$or" | "$nor")
        }
        None => false,
    };

    if value_form {
        Ok(MatchExpression::ElemMatchValue {
            path: path.to_string(),
            children: parse_operators("", obj)?,
        })
    } else {
        Ok(MatchExpression::ElemMatchObject {
            path: path.to_string(),
            child: Box::new(parse_document(obj)?),
        })
    }
}

fn internal_expr(path: &str, op: ComparisonOp, arg: &Json) -> QueryResult<MatchExpression> {
    let value = from_json(arg);
    if matches!(value, Value::Undefined) {
        return Err(QueryError::bad_field_value(
            path,
            format!("{} cannot compare to undefined", op.internal_expr_name()),
        ));
    }
    Ok(MatchExpression::InternalExpr {
        path: path.to_string(),
        op,
        value,
    })
}

fn is_truthy(arg: &Json) -> bool {
    match arg {
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Json::Null => false,
        _ => true,
    }
}
