//! Typed node decoding.
//!
//! Turns [`TypedNode`]s into plain [`DecodedValue`]s. The rules, which
//! downstream documents depend on exactly:
//!
//! - map fields are decoded with numbers forced to numeric values
//! - list elements are decoded *without* forcing, so a number directly inside
//!   a list stays a string (maps inside that list force again)
//! - reserved field names are escaped by doubling their first underscore
//! - unrecognized tags produce no value; the containing map or list omits them

use std::borrow::Cow;

use common::{DecodedValue, Document, Number};

use crate::node::{Record, TypedNode};
use crate::{RecordError, Result};

/// Field names that collide with document-store metadata.
pub const RESERVED_FIELDS: [&str; 12] = [
    "uid",
    "_id",
    "_type",
    "_source",
    "_all",
    "_parent",
    "_fieldnames",
    "_routing",
    "_index",
    "_size",
    "_timestamp",
    "_ttl",
];

/// Result of decoding one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The node produced a value.
    Value(DecodedValue),
    /// The node carried a tag the decoder does not know; no value was produced.
    Unrecognized(String),
}

impl Decoded {
    /// Returns the produced value, if any.
    pub fn into_value(self) -> Option<DecodedValue> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Unrecognized(_) => None,
        }
    }
}

/// Escapes a reserved field name by replacing its first `_` with `__`.
///
/// `uid` is reserved but has no underscore, so it passes through unchanged.
pub fn escape_field_name(name: &str) -> Cow<'_, str> {
    if RESERVED_FIELDS.contains(&name) {
        Cow::Owned(name.replacen('_', "__", 1))
    } else {
        Cow::Borrowed(name)
    }
}

/// Parses a number literal, preferring an integer over a float.
///
/// Surrounding whitespace is ignored. Non-finite floats are rejected since
/// they have no document representation.
pub fn parse_number(literal: &str) -> Result<Number> {
    let trimmed = literal.trim();
    if let Ok(int) = trimmed.parse::<i128>() {
        return Ok(Number::Int(int));
    }
    match trimmed.parse::<f64>() {
        Ok(float) if float.is_finite() => Ok(Number::Float(float)),
        _ => Err(RecordError::InvalidNumber(literal.to_string())),
    }
}

/// Decodes one typed node.
///
/// With `force_numeric` false, number literals are returned as strings.
pub fn decode(node: &TypedNode, force_numeric: bool) -> Result<Decoded> {
    let value = match node {
        TypedNode::Null => DecodedValue::Null,
        TypedNode::String(s) => DecodedValue::String(s.clone()),
        TypedNode::Bool(b) => DecodedValue::Bool(*b),
        TypedNode::Number(literal) => decode_number(literal, force_numeric)?,
        TypedNode::Map(fields) => DecodedValue::Map(decode_map(fields)?),
        TypedNode::List(items) => DecodedValue::List(decode_list(items)?),
        TypedNode::ByteSet(members) | TypedNode::StringSet(members) => DecodedValue::List(
            members
                .iter()
                .map(|member| DecodedValue::String(member.clone()))
                .collect(),
        ),
        TypedNode::NumberSet(members) => DecodedValue::List(
            members
                .iter()
                .map(|literal| decode_number(literal, force_numeric))
                .collect::<Result<_>>()?,
        ),
        TypedNode::Unrecognized { tag, .. } => return Ok(Decoded::Unrecognized(tag.clone())),
    };
    Ok(Decoded::Value(value))
}

/// Decodes a record-level mapping as if it were a map node.
pub fn decode_record(record: &Record) -> Result<Document> {
    decode_map(record)
}

fn decode_number(literal: &str, force_numeric: bool) -> Result<DecodedValue> {
    if force_numeric {
        parse_number(literal).map(DecodedValue::Number)
    } else {
        Ok(DecodedValue::String(literal.to_string()))
    }
}

fn decode_map(fields: &Record) -> Result<Document> {
    let mut document = Document::new();
    for (name, node) in fields {
        match decode(node, true)? {
            Decoded::Value(value) => {
                document.insert(escape_field_name(name).into_owned(), value);
            }
            Decoded::Unrecognized(tag) => skip_unrecognized(&tag, name),
        }
    }
    Ok(document)
}

fn decode_list(items: &[TypedNode]) -> Result<Vec<DecodedValue>> {
    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match decode(item, false)? {
            Decoded::Value(value) => values.push(value),
            Decoded::Unrecognized(tag) => skip_unrecognized(&tag, &format!("[{index}]")),
        }
    }
    Ok(values)
}

fn skip_unrecognized(tag: &str, location: &str) {
    tracing::warn!(%tag, field = %location, "dropping value with unrecognized type tag");
    metrics::counter!("decoder_unrecognized_tags").increment(1);
}
