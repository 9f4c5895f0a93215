//! Interval evaluation tree evaluation
//!
//! Evaluation is pure: the same tree and the same bindings always produce
//! the same interval list. Each `Eval` node applies the bound-construction
//! rule from `bounds::rules` that translation used when the tree was built.

use super::builder::complement_tightness;
use super::errors::{IetError, IetResult};
use super::node::{EvalOp, Iet, InputParamId};
use crate::bounds::rules::{self, PredicateBounds};
use crate::bounds::{OrderedIntervalList, Tightness};
use crate::query::{Collator, ComparisonOp};
use crate::value::Value;

/// Value bound to one input parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub enum InputParam {
    Scalar(Value),
    /// The whole list of an `$in`
    List(Vec<Value>),
}

/// Slot-indexed parameter values for one query invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputParamBindings {
    slots: Vec<Option<InputParam>>,
}

impl InputParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `param` to slot `id`, growing the slot vector as needed.
    pub fn bind(&mut self, id: InputParamId, param: InputParam) {
        if self.slots.len() <= id {
            self.slots.resize(id + 1, None);
        }
        self.slots[id] = Some(param);
    }

    pub fn get(&self, id: InputParamId) -> Option<&InputParam> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Number of slots, bound or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Result of evaluating a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedBounds {
    pub oil: OrderedIntervalList,
    pub tightness: Tightness,
}

impl From<PredicateBounds> for EvaluatedBounds {
    fn from(b: PredicateBounds) -> Self {
        Self {
            oil: b.oil,
            tightness: b.tightness,
        }
    }
}

/// Evaluate `iet` against `bindings`.
///
/// String literals are mapped through `collator` exactly as they were when
/// the tree was built.
pub fn evaluate(
    iet: &Iet,
    bindings: &InputParamBindings,
    collator: Option<&dyn Collator>,
) -> IetResult<EvaluatedBounds> {
    match iet {
        Iet::Const { oil, tightness } => Ok(EvaluatedBounds {
            oil: oil.clone(),
            tightness: *tightness,
        }),
        Iet::Eval { op, param } => {
            let bound = bindings
                .get(*param)
                .ok_or_else(|| IetError::missing_binding(*param))?;
            evaluate_eval(*op, *param, bound, collator).map(EvaluatedBounds::from)
        }
        Iet::Intersect(l, r) => {
            let l = evaluate(l, bindings, collator)?;
            let r = evaluate(r, bindings, collator)?;
            Ok(EvaluatedBounds {
                oil: l.oil.intersect(&r.oil),
                tightness: l.tightness.looser(r.tightness),
            })
        }
        Iet::Union(l, r) => {
            let l = evaluate(l, bindings, collator)?;
            let r = evaluate(r, bindings, collator)?;
            Ok(EvaluatedBounds {
                oil: l.oil.union(&r.oil),
                tightness: l.tightness.looser(r.tightness),
            })
        }
        Iet::Complement(c) => {
            let c = evaluate(c, bindings, collator)?;
            Ok(EvaluatedBounds {
                oil: c.oil.complement(),
                tightness: complement_tightness(c.tightness),
            })
        }
    }
}

fn evaluate_eval(
    op: EvalOp,
    param: InputParamId,
    bound: &InputParam,
    collator: Option<&dyn Collator>,
) -> IetResult<PredicateBounds> {
    let cmp = match op {
        EvalOp::Eq => ComparisonOp::Eq,
        EvalOp::Lt => ComparisonOp::Lt,
        EvalOp::Lte => ComparisonOp::Lte,
        EvalOp::Gt => ComparisonOp::Gt,
        EvalOp::Gte => ComparisonOp::Gte,
        EvalOp::In => {
            return match bound {
                InputParam::List(values) => Ok(rules::in_bounds(values, collator)),
                InputParam::Scalar(_) => Err(IetError::binding_mismatch(op, param, "a list")),
            };
        }
        EvalOp::Regex => {
            return match bound {
                InputParam::Scalar(v @ Value::Regex { .. }) => Ok(rules::regex_bounds(v)),
                _ => Err(IetError::binding_mismatch(op, param, "a regex")),
            };
        }
    };

    match bound {
        InputParam::Scalar(v) => Ok(rules::comparison_bounds(cmp, v, collator)),
        InputParam::List(_) => Err(IetError::binding_mismatch(op, param, "a scalar")),
    }
}
