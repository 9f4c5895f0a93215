//! Typed document values
//!
//! Values carry the full set of types that can appear in an index key,
//! including the two sentinel extrema `MinKey` and `MaxKey`.

use std::fmt;

/// A typed document value as it appears in filters and index bounds.
#[derive(Debug, Clone)]
pub enum Value {
    /// Sentinel smaller than every other value
    MinKey,
    /// Legacy undefined value (stands in for "missing" in index keys)
    Undefined,
    /// Null
    Null,
    /// 64-bit integer
    Int(i64),
    /// IEEE double (NaN and infinities allowed)
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Embedded document, field order preserved
    Object(Vec<(String, Value)>),
    /// Array
    Array(Vec<Value>),
    /// Boolean
    Bool(bool),
    /// Date as milliseconds since the Unix epoch
    Date(i64),
    /// Regular expression literal
    Regex { pattern: String, flags: String },
    /// Sentinel larger than every other value
    MaxKey,
}

/// Canonical type classes, in index-key order.
///
/// Values of different canonical types compare by class alone. Numeric
/// representations share one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalType {
    MinKey,
    Undefined,
    Null,
    Number,
    String,
    Object,
    Array,
    Bool,
    Date,
    Regex,
    MaxKey,
}

impl CanonicalType {
    /// All canonical types in ascending order.
    pub const ALL: [CanonicalType; 11] = [
        CanonicalType::MinKey,
        CanonicalType::Undefined,
        CanonicalType::Null,
        CanonicalType::Number,
        CanonicalType::String,
        CanonicalType::Object,
        CanonicalType::Array,
        CanonicalType::Bool,
        CanonicalType::Date,
        CanonicalType::Regex,
        CanonicalType::MaxKey,
    ];

    /// Short tag used in query shape encodings
    pub fn tag(&self) -> &'static str {
        match self {
            CanonicalType::MinKey => "minkey",
            CanonicalType::Undefined => "undefined",
            CanonicalType::Null => "null",
            CanonicalType::Number => "num",
            CanonicalType::String => "str",
            CanonicalType::Object => "obj",
            CanonicalType::Array => "arr",
            CanonicalType::Bool => "bool",
            CanonicalType::Date => "date",
            CanonicalType::Regex => "regex",
            CanonicalType::MaxKey => "maxkey",
        }
    }

    /// The next canonical type in index-key order, if any.
    pub fn next(&self) -> Option<CanonicalType> {
        let pos = Self::ALL.iter().position(|t| t == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    /// Smallest value of this type.
    pub fn min_value(&self) -> Value {
        match self {
            CanonicalType::MinKey => Value::MinKey,
            CanonicalType::Undefined => Value::Undefined,
            CanonicalType::Null => Value::Null,
            CanonicalType::Number => Value::Double(f64::NAN),
            CanonicalType::String => Value::String(String::new()),
            CanonicalType::Object => Value::Object(Vec::new()),
            CanonicalType::Array => Value::Array(Vec::new()),
            CanonicalType::Bool => Value::Bool(false),
            CanonicalType::Date => Value::Date(i64::MIN),
            CanonicalType::Regex => Value::Regex {
                pattern: String::new(),
                flags: String::new(),
            },
            CanonicalType::MaxKey => Value::MaxKey,
        }
    }

    /// Largest value of this type, or None when the type has no maximum.
    pub fn max_value(&self) -> Option<Value> {
        match self {
            CanonicalType::MinKey => Some(Value::MinKey),
            CanonicalType::Undefined => Some(Value::Undefined),
            CanonicalType::Null => Some(Value::Null),
            CanonicalType::Number => Some(Value::Double(f64::INFINITY)),
            CanonicalType::Bool => Some(Value::Bool(true)),
            CanonicalType::Date => Some(Value::Date(i64::MAX)),
            CanonicalType::MaxKey => Some(Value::MaxKey),
            CanonicalType::String
            | CanonicalType::Object
            | CanonicalType::Array
            | CanonicalType::Regex => None,
        }
    }
}

impl Value {
    /// Canonical type class of this value
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            Value::MinKey => CanonicalType::MinKey,
            Value::Undefined => CanonicalType::Undefined,
            Value::Null => CanonicalType::Null,
            Value::Int(_) | Value::Double(_) => CanonicalType::Number,
            Value::String(_) => CanonicalType::String,
            Value::Object(_) => CanonicalType::Object,
            Value::Array(_) => CanonicalType::Array,
            Value::Bool(_) => CanonicalType::Bool,
            Value::Date(_) => CanonicalType::Date,
            Value::Regex { .. } => CanonicalType::Regex,
            Value::MaxKey => CanonicalType::MaxKey,
        }
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a regex value
    pub fn regex(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Value::Regex {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Returns true for any numeric value
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    /// Returns true for a double NaN
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Double(d) if d.is_nan())
    }

    /// Returns true if this is the largest value of its canonical type.
    pub fn is_max_of_type(&self) -> bool {
        match self.canonical_type().max_value() {
            Some(max) => self == &max,
            None => false,
        }
    }

    /// Apply `f` to every string nested in this value.
    pub fn map_strings(&self, f: &dyn Fn(&str) -> String) -> Value {
        match self {
            Value::String(s) => Value::String(f(s)),
            Value::Array(items) => Value::Array(items.iter().map(|v| v.map_strings(f)).collect()),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.map_strings(f)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn fmt_double(f: &mut fmt::Formatter<'_>, d: f64) -> fmt::Result {
    if d.is_nan() {
        write!(f, "nan.0")
    } else if d.is_infinite() {
        if d > 0.0 {
            write!(f, "inf.0")
        } else {
            write!(f, "-inf.0")
        }
    } else if d.fract() == 0.0 && d.abs() < 1e16 {
        write!(f, "{:.1}", d)
    } else {
        write!(f, "{}", d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::MinKey => write!(f, "MinKey"),
            Value::MaxKey => write!(f, "MaxKey"),
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => fmt_double(f, *d),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(ms) => write!(f, "new Date({})", ms),
            Value::Regex { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
            Value::Array(items) => {
                if items.is_empty() {
                    return write!(f, "[]");
                }
                write!(f, "[ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, " ]")
            }
            Value::Object(fields) => {
                if fields.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, " }}")
            }
        }
    }
}
