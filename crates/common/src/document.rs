//! Plain document model produced by decoding typed change records.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A decoded document: field name to decoded value.
pub type Document = BTreeMap<String, DecodedValue>;

/// A numeric scalar.
///
/// Integer literals are held as `i128`, which covers every integer the change
/// log can carry (38 significant digits) without loss. Anything with a
/// fractional or exponent part, or too large for `i128`, becomes a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Returns the value as an `i128` if it is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Number::Int(v) => Some(*v),
            Number::Float(_) => None,
        }
    }

    /// Returns the value as an `f64`, converting integers.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::Float(v) => *v,
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(v) => match i64::try_from(v) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_i128(v),
            },
            Number::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // serde_json keeps the trailing ".0" on integral floats.
            Number::Float(v) => {
                let rendered = serde_json::to_string(v).map_err(|_| std::fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v.into())
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A decoded value: the untyped counterpart of a typed change-record node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<DecodedValue>),
    Map(Document),
}

impl DecodedValue {
    /// Returns true if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number payload, if this is a number.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            DecodedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested document, if this is a map.
    pub fn as_map(&self) -> Option<&Document> {
        match self {
            DecodedValue::Map(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Strings render bare; everything else renders as its JSON form.
impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedValue::String(s) => f.write_str(s),
            DecodedValue::Number(n) => write!(f, "{n}"),
            other => {
                let rendered = serde_json::to_string(other).map_err(|_| std::fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<&str> for DecodedValue {
    fn from(s: &str) -> Self {
        DecodedValue::String(s.to_string())
    }
}

impl From<String> for DecodedValue {
    fn from(s: String) -> Self {
        DecodedValue::String(s)
    }
}

impl From<bool> for DecodedValue {
    fn from(b: bool) -> Self {
        DecodedValue::Bool(b)
    }
}

impl From<i64> for DecodedValue {
    fn from(v: i64) -> Self {
        DecodedValue::Number(Number::from(v))
    }
}

impl From<f64> for DecodedValue {
    fn from(v: f64) -> Self {
        DecodedValue::Number(Number::Float(v))
    }
}

impl From<Number> for DecodedValue {
    fn from(n: Number) -> Self {
        DecodedValue::Number(n)
    }
}

impl From<Vec<DecodedValue>> for DecodedValue {
    fn from(items: Vec<DecodedValue>) -> Self {
        DecodedValue::List(items)
    }
}

impl From<Document> for DecodedValue {
    fn from(doc: Document) -> Self {
        DecodedValue::Map(doc)
    }
}
