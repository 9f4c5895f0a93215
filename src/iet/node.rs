//! Interval evaluation tree nodes

use std::fmt;

use crate::bounds::{OrderedIntervalList, Tightness};

/// Index of an input parameter slot.
pub type InputParamId = usize;

/// Predicate operators that can be evaluated against a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    In,
    Regex,
}

impl EvalOp {
    pub fn name(&self) -> &'static str {
        match self {
            EvalOp::Lt => "$lt",
            EvalOp::Lte => "$lte",
            EvalOp::Gt => "$gt",
            EvalOp::Gte => "$gte",
            EvalOp::Eq => "$eq",
            EvalOp::In => "$in",
            EvalOp::Regex => "$regex",
        }
    }
}

impl fmt::Display for EvalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A deferred bounds computation for one index field.
///
/// Built once when a plan is cached, evaluated for every later query of the
/// same shape with that query's parameter values. Trees are immutable once
/// built.
#[derive(Debug, Clone, PartialEq)]
pub enum Iet {
    /// Bounds that do not depend on any parameter
    Const {
        oil: OrderedIntervalList,
        tightness: Tightness,
    },
    /// Bounds computed from one parameter slot
    Eval { op: EvalOp, param: InputParamId },
    Intersect(Box<Iet>, Box<Iet>),
    Union(Box<Iet>, Box<Iet>),
    Complement(Box<Iet>),
}

impl Iet {
    /// Constant `[MinKey, MaxKey]`, used for fields without predicates.
    pub fn all_values() -> Self {
        Iet::Const {
            oil: OrderedIntervalList::all_values(),
            tightness: Tightness::Exact,
        }
    }

    /// Parameter slots referenced by this tree, in left-to-right order.
    pub fn params(&self) -> Vec<InputParamId> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<InputParamId>) {
        match self {
            Iet::Const { .. } => {}
            Iet::Eval { param, .. } => out.push(*param),
            Iet::Intersect(l, r) | Iet::Union(l, r) => {
                l.collect_params(out);
                r.collect_params(out);
            }
            Iet::Complement(c) => c.collect_params(out),
        }
    }

    /// True if evaluation depends on at least one parameter.
    pub fn is_parameterized(&self) -> bool {
        match self {
            Iet::Const { .. } => false,
            Iet::Eval { .. } => true,
            Iet::Intersect(l, r) | Iet::Union(l, r) => l.is_parameterized() || r.is_parameterized(),
            Iet::Complement(c) => c.is_parameterized(),
        }
    }
}

impl fmt::Display for Iet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Iet::Const { oil, .. } => {
                if oil.is_empty() {
                    write!(f, "(const)")
                } else {
                    write!(f, "(const {})", oil)
                }
            }
            Iet::Eval { op, param } => write!(f, "(eval {} #{})", op, param),
            Iet::Intersect(l, r) => write!(f, "(intersect {} {})", l, r),
            Iet::Union(l, r) => write!(f, "(union {} {})", l, r),
            Iet::Complement(c) => write!(f, "(not {})", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: EvalOp, param: InputParamId) -> Box<Iet> {
        Box::new(Iet::Eval { op, param })
    }

    #[test]
    fn test_display_nested() {
        let iet = Iet::Intersect(eval(EvalOp::Lt, 0), eval(EvalOp::Gt, 1));
        assert_eq!(iet.to_string(), "(intersect (eval $lt #0) (eval $gt #1))");

        let not = Iet::Complement(eval(EvalOp::In, 3));
        assert_eq!(not.to_string(), "(not (eval $in #3))");
    }

    #[test]
    fn test_empty_const_display() {
        let iet = Iet::Const {
            oil: OrderedIntervalList::new(),
            tightness: Tightness::Exact,
        };
        assert_eq!(iet.to_string(), "(const)");
        assert_eq!(Iet::all_values().to_string(), "(const [MinKey, MaxKey])");
    }

    #[test]
    fn test_params_in_order() {
        let iet = Iet::Union(
            Box::new(Iet::Intersect(eval(EvalOp::Eq, 0), eval(EvalOp::Lt, 1))),
            Box::new(Iet::Complement(eval(EvalOp::Gt, 2))),
        );
        assert_eq!(iet.params(), vec![0, 1, 2]);
        assert!(iet.is_parameterized());
        assert!(!Iet::all_values().is_parameterized());
    }
}
