//! Stack-based interval evaluation tree construction
//!
//! Bounds translation walks a predicate tree and calls the builder in
//! post-order: leaves push nodes, combinators pop their operands and push
//! the combined node. A well-formed walk leaves exactly one node on the
//! stack.

use super::node::{EvalOp, Iet, InputParamId};
use crate::bounds::{OrderedIntervalList, Tightness};

#[derive(Debug, Default)]
pub struct Builder {
    stack: Vec<Iet>,
    invalid: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a parameter-independent node.
    pub fn add_const(&mut self, oil: OrderedIntervalList, tightness: Tightness) {
        self.stack.push(Iet::Const { oil, tightness });
    }

    /// Push a node evaluated from parameter slot `param`.
    pub fn add_eval(&mut self, op: EvalOp, param: InputParamId) {
        self.stack.push(Iet::Eval { op, param });
    }

    /// Replace the top two nodes with their intersection.
    pub fn add_intersect(&mut self) {
        if let Some((l, r)) = self.pop_pair() {
            self.stack.push(Iet::Intersect(Box::new(l), Box::new(r)));
        }
    }

    /// Replace the top two nodes with their union.
    pub fn add_union(&mut self) {
        if let Some((l, r)) = self.pop_pair() {
            self.stack.push(Iet::Union(Box::new(l), Box::new(r)));
        }
    }

    /// Replace the top node with its complement.
    ///
    /// A constant child is complemented eagerly.
    pub fn add_complement(&mut self) {
        let child = match self.stack.pop() {
            Some(child) => child,
            None => {
                self.invalid = true;
                return;
            }
        };

        let node = match child {
            Iet::Const { oil, tightness } => Iet::Const {
                oil: oil.complement(),
                tightness: complement_tightness(tightness),
            },
            other => Iet::Complement(Box::new(other)),
        };
        self.stack.push(node);
    }

    /// Discard the top node, if any.
    pub fn pop(&mut self) -> Option<Iet> {
        self.stack.pop()
    }

    /// Finish construction.
    ///
    /// Returns None if nothing was added or the calls did not reduce to a
    /// single root.
    pub fn done(mut self) -> Option<Iet> {
        if self.invalid || self.stack.len() != 1 {
            return None;
        }
        self.stack.pop()
    }

    fn pop_pair(&mut self) -> Option<(Iet, Iet)> {
        if self.stack.len() < 2 {
            self.invalid = true;
            return None;
        }
        let r = self.stack.pop()?;
        let l = self.stack.pop()?;
        Some((l, r))
    }
}

/// Complementing inexact bounds can only over-approximate.
pub(crate) fn complement_tightness(tightness: Tightness) -> Tightness {
    match tightness {
        Tightness::Exact => Tightness::Exact,
        _ => Tightness::InexactFetch,
    }
}
