//! Auto-parameterization
//!
//! Assigns input parameter slots to the literals of a normalized filter, in
//! pre-order, numbering from zero. A literal gets a slot only when bounds
//! built for one value of its type stay correct for every other value of
//! that type:
//! - comparisons skip MinKey, MaxKey, null, undefined, arrays and NaN
//! - `$in` gets one slot unless it holds a regex, null or an array
//! - `$regex` gets one slot, `$mod` two
//! - `$type`, `$exists` and internal expression comparisons get none

use super::expression::MatchExpression;
use crate::iet::{InputParam, InputParamBindings, InputParamId};
use crate::value::Value;

/// Assign slots in place. Returns the number of slots assigned.
pub fn parameterize(expr: &mut MatchExpression) -> usize {
    let mut next: InputParamId = 0;
    assign(expr, &mut next);
    next
}

fn assign(expr: &mut MatchExpression, next: &mut InputParamId) {
    match expr {
        MatchExpression::Comparison { value, param, .. } => {
            if is_parameterizable_scalar(value) {
                *param = Some(take(next));
            }
        }
        MatchExpression::In { values, param, .. } => {
            if values.iter().all(is_parameterizable_in_element) {
                *param = Some(take(next));
            }
        }
        MatchExpression::Regex { param, .. } => *param = Some(take(next)),
        MatchExpression::Mod { params, .. } => {
            let divisor = take(next);
            let remainder = take(next);
            *params = Some((divisor, remainder));
        }
        MatchExpression::And(children)
        | MatchExpression::Or(children)
        | MatchExpression::Nor(children)
        | MatchExpression::ElemMatchValue { children, .. } => {
            for child in children {
                assign(child, next);
            }
        }
        MatchExpression::Not(child) | MatchExpression::ElemMatchObject { child, .. } => {
            assign(child, next)
        }
        MatchExpression::Exists { .. }
        | MatchExpression::Type { .. }
        | MatchExpression::InternalExpr { .. }
        | MatchExpression::AlwaysFalse
        | MatchExpression::AlwaysTrue => {}
    }
}

fn take(next: &mut InputParamId) -> InputParamId {
    let id = *next;
    *next += 1;
    id
}

fn is_parameterizable_scalar(value: &Value) -> bool {
    !matches!(
        value,
        Value::MinKey | Value::MaxKey | Value::Null | Value::Undefined | Value::Array(_)
    ) && !value.is_nan()
}

fn is_parameterizable_in_element(value: &Value) -> bool {
    !matches!(value, Value::Regex { .. } | Value::Null | Value::Array(_))
}

/// Collect the literal bound to every assigned slot.
pub fn extract_bindings(expr: &MatchExpression) -> InputParamBindings {
    let mut bindings = InputParamBindings::new();
    collect(expr, &mut bindings);
    bindings
}

fn collect(expr: &MatchExpression, bindings: &mut InputParamBindings) {
    match expr {
        MatchExpression::Comparison {
            value,
            param: Some(id),
            ..
        } => bindings.bind(*id, InputParam::Scalar(value.clone())),
        MatchExpression::In {
            values,
            param: Some(id),
            ..
        } => bindings.bind(*id, InputParam::List(values.clone())),
        MatchExpression::Regex {
            pattern,
            flags,
            param: Some(id),
            ..
        } => bindings.bind(
            *id,
            InputParam::Scalar(Value::regex(pattern.clone(), flags.clone())),
        ),
        MatchExpression::Mod {
            divisor,
            remainder,
            params: Some((d, r)),
            ..
        } => {
            bindings.bind(*d, InputParam::Scalar(Value::Int(*divisor)));
            bindings.bind(*r, InputParam::Scalar(Value::Int(*remainder)));
        }
        other => {
            for child in other.children() {
                collect(child, bindings);
            }
        }
    }
}
