//! Interval Evaluation Trees
//!
//! An IET records how the bounds of one index field were derived from a
//! query's predicates, with parameterized literals left as slot references.
//! A cached plan keeps one tree per index field and re-derives bounds for a
//! new query of the same shape by evaluating the trees against that query's
//! literals, without re-running bounds translation.

mod builder;
mod errors;
mod eval;
mod node;

pub use builder::Builder;
pub use errors::{IetError, IetErrorCode, IetResult};
pub use eval::{evaluate, EvaluatedBounds, InputParam, InputParamBindings};
pub use node::{EvalOp, Iet, InputParamId};
