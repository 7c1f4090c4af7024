//! Built-in value kinds and the runtime value/default representation.

use std::fmt;

/// The primitive or composite kinds a [`crate::column::Column`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Int64,
    Uint64,
    Double,
    Timestamp,
    String,
    Object,
    /// Array of pointers to a related record type; not itself a SQL column.
    PointerArray,
}

impl ValueKind {
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ValueKind::Int | ValueKind::Uint | ValueKind::Int64 | ValueKind::Uint64
        )
    }

    pub fn size_hint(self) -> usize {
        match self {
            ValueKind::Bool => 1,
            ValueKind::Int | ValueKind::Uint => 4,
            ValueKind::Int64 | ValueKind::Uint64 | ValueKind::Double => 8,
            ValueKind::Timestamp => 8,
            ValueKind::String | ValueKind::Object | ValueKind::PointerArray => 0,
        }
    }
}

/// A literal usable as a column default or in generated SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    /// An opaque SQL expression copied verbatim (e.g. `CURRENT_TIMESTAMP`).
    Raw(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Raw(s) => write!(f, "{s}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}
