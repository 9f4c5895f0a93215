//! Match expression tree
//!
//! The parsed representation of a query filter. Leaves carry the input
//! parameter slot assigned by auto-parameterization; slots are `None` until
//! `parameterize` runs and stay `None` for literals that are not
//! parameterizable.

use crate::iet::{EvalOp, InputParamId};
use crate::value::{CanonicalType, Value};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    /// Operator name as written in a filter
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
        }
    }

    /// Name of the internal expression form of this operator
    pub fn internal_expr_name(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$_internalExprEq",
            ComparisonOp::Lt => "$_internalExprLt",
            ComparisonOp::Lte => "$_internalExprLte",
            ComparisonOp::Gt => "$_internalExprGt",
            ComparisonOp::Gte => "$_internalExprGte",
        }
    }

    pub fn eval_op(&self) -> EvalOp {
        match self {
            ComparisonOp::Eq => EvalOp::Eq,
            ComparisonOp::Lt => EvalOp::Lt,
            ComparisonOp::Lte => EvalOp::Lte,
            ComparisonOp::Gt => EvalOp::Gt,
            ComparisonOp::Gte => EvalOp::Gte,
        }
    }
}

/// A `$type` argument, by alias or numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsonTypeTag {
    Double,
    String,
    Object,
    Array,
    Undefined,
    Bool,
    Date,
    Null,
    Regex,
    Int,
    Long,
    Decimal,
    MinKey,
    MaxKey,
    /// Any numeric type
    Number,
}

impl BsonTypeTag {
    pub fn from_alias(alias: &str) -> Option<Self> {
        Some(match alias {
            "double" => BsonTypeTag::Double,
            "string" => BsonTypeTag::String,
            "object" => BsonTypeTag::Object,
            "array" => BsonTypeTag::Array,
            "undefined" => BsonTypeTag::Undefined,
            "bool" => BsonTypeTag::Bool,
            "date" => BsonTypeTag::Date,
            "null" => BsonTypeTag::Null,
            "regex" => BsonTypeTag::Regex,
            "int" => BsonTypeTag::Int,
            "long" => BsonTypeTag::Long,
            "decimal" => BsonTypeTag::Decimal,
            "minKey" => BsonTypeTag::MinKey,
            "maxKey" => BsonTypeTag::MaxKey,
            "number" => BsonTypeTag::Number,
            _ => return None,
        })
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => BsonTypeTag::Double,
            2 => BsonTypeTag::String,
            3 => BsonTypeTag::Object,
            4 => BsonTypeTag::Array,
            6 => BsonTypeTag::Undefined,
            8 => BsonTypeTag::Bool,
            9 => BsonTypeTag::Date,
            10 => BsonTypeTag::Null,
            11 => BsonTypeTag::Regex,
            16 => BsonTypeTag::Int,
            18 => BsonTypeTag::Long,
            19 => BsonTypeTag::Decimal,
            -1 => BsonTypeTag::MinKey,
            127 => BsonTypeTag::MaxKey,
            _ => return None,
        })
    }

    pub fn alias(&self) -> &'static str {
        match self {
            BsonTypeTag::Double => "double",
            BsonTypeTag::String => "string",
            BsonTypeTag::Object => "object",
            BsonTypeTag::Array => "array",
            BsonTypeTag::Undefined => "undefined",
            BsonTypeTag::Bool => "bool",
            BsonTypeTag::Date => "date",
            BsonTypeTag::Null => "null",
            BsonTypeTag::Regex => "regex",
            BsonTypeTag::Int => "int",
            BsonTypeTag::Long => "long",
            BsonTypeTag::Decimal => "decimal",
            BsonTypeTag::MinKey => "minKey",
            BsonTypeTag::MaxKey => "maxKey",
            BsonTypeTag::Number => "number",
        }
    }

    /// Index-key type class. All numeric types share one bracket.
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            BsonTypeTag::Double
            | BsonTypeTag::Int
            | BsonTypeTag::Long
            | BsonTypeTag::Decimal
            | BsonTypeTag::Number => CanonicalType::Number,
            BsonTypeTag::String => CanonicalType::String,
            BsonTypeTag::Object => CanonicalType::Object,
            BsonTypeTag::Array => CanonicalType::Array,
            BsonTypeTag::Undefined => CanonicalType::Undefined,
            BsonTypeTag::Bool => CanonicalType::Bool,
            BsonTypeTag::Date => CanonicalType::Date,
            BsonTypeTag::Null => CanonicalType::Null,
            BsonTypeTag::Regex => CanonicalType::Regex,
            BsonTypeTag::MinKey => CanonicalType::MinKey,
            BsonTypeTag::MaxKey => CanonicalType::MaxKey,
        }
    }
}

/// Node kinds in sort order.
///
/// Normalization orders sibling predicates by this rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchType {
    And,
    Or,
    Eq,
    Lte,
    Lt,
    Gt,
    Gte,
    Regex,
    Mod,
    Exists,
    In,
    Type,
    ElemMatchObject,
    ElemMatchValue,
    Not,
    Nor,
    InternalExpr,
    AlwaysFalse,
    AlwaysTrue,
}

/// A parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchExpression {
    And(Vec<MatchExpression>),
    Or(Vec<MatchExpression>),
    Nor(Vec<MatchExpression>),
    Not(Box<MatchExpression>),
    Comparison {
        path: String,
        op: ComparisonOp,
        value: Value,
        param: Option<InputParamId>,
    },
    In {
        path: String,
        values: Vec<Value>,
        param: Option<InputParamId>,
    },
    Regex {
        path: String,
        pattern: String,
        flags: String,
        param: Option<InputParamId>,
    },
    Exists {
        path: String,
    },
    /// `$type`; never parameterized
    Type {
        path: String,
        types: Vec<BsonTypeTag>,
    },
    Mod {
        path: String,
        divisor: i64,
        remainder: i64,
        params: Option<(InputParamId, InputParamId)>,
    },
    /// `$elemMatch` over array elements, with operator-only children
    /// whose paths are empty
    ElemMatchValue {
        path: String,
        children: Vec<MatchExpression>,
    },
    /// `$elemMatch` over embedded documents
    ElemMatchObject {
        path: String,
        child: Box<MatchExpression>,
    },
    /// `$_internalExpr*` comparisons; never parameterized
    InternalExpr {
        path: String,
        op: ComparisonOp,
        value: Value,
    },
    AlwaysFalse,
    AlwaysTrue,
}

impl MatchExpression {
    pub fn match_type(&self) -> MatchType {
        match self {
            MatchExpression::And(_) => MatchType::And,
            MatchExpression::Or(_) => MatchType::Or,
            MatchExpression::Nor(_) => MatchType::Nor,
            MatchExpression::Not(_) => MatchType::Not,
            MatchExpression::Comparison { op, .. } => match op {
                ComparisonOp::Eq => MatchType::Eq,
                ComparisonOp::Lt => MatchType::Lt,
                ComparisonOp::Lte => MatchType::Lte,
                ComparisonOp::Gt => MatchType::Gt,
                ComparisonOp::Gte => MatchType::Gte,
            },
            MatchExpression::In { .. } => MatchType::In,
            MatchExpression::Regex { .. } => MatchType::Regex,
            MatchExpression::Exists { .. } => MatchType::Exists,
            MatchExpression::Type { .. } => MatchType::Type,
            MatchExpression::Mod { .. } => MatchType::Mod,
            MatchExpression::ElemMatchValue { .. } => MatchType::ElemMatchValue,
            MatchExpression::ElemMatchObject { .. } => MatchType::ElemMatchObject,
            MatchExpression::InternalExpr { .. } => MatchType::InternalExpr,
            MatchExpression::AlwaysFalse => MatchType::AlwaysFalse,
            MatchExpression::AlwaysTrue => MatchType::AlwaysTrue,
        }
    }

    /// Field path of a leaf; `Not` reports its child's path.
    pub fn path(&self) -> Option<&str> {
        match self {
            MatchExpression::Comparison { path, .. }
            | MatchExpression::In { path, .. }
            | MatchExpression::Regex { path, .. }
            | MatchExpression::Exists { path }
            | MatchExpression::Type { path, .. }
            | MatchExpression::Mod { path, .. }
            | MatchExpression::ElemMatchValue { path, .. }
            | MatchExpression::ElemMatchObject { path, .. }
            | MatchExpression::InternalExpr { path, .. } => Some(path),
            MatchExpression::Not(child) => child.path(),
            _ => None,
        }
    }

    /// Children of logical nodes, in order.
    pub fn children(&self) -> &[MatchExpression] {
        match self {
            MatchExpression::And(c) | MatchExpression::Or(c) | MatchExpression::Nor(c) => c,
            MatchExpression::ElemMatchValue { children, .. } => children,
            MatchExpression::Not(child) | MatchExpression::ElemMatchObject { child, .. } => {
                std::slice::from_ref(&**child)
            }
            _ => &[],
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            MatchExpression::And(_) | MatchExpression::Or(_) | MatchExpression::Nor(_)
        )
    }

    /// Number of parameter slots assigned anywhere in this tree.
    pub fn param_count(&self) -> usize {
        let own = match self {
            MatchExpression::Comparison { param, .. }
            | MatchExpression::In { param, .. }
            | MatchExpression::Regex { param, .. } => usize::from(param.is_some()),
            MatchExpression::Mod { params, .. } => {
                if params.is_some() {
                    2
                } else {
                    0
                }
            }
            _ => 0,
        };
        own + self.children().iter().map(Self::param_count).sum::<usize>()
    }
}
