//! Type-tagged value encoding used by change records.
//!
//! On the wire every value is a single-key JSON object whose key names the
//! type: `{"S": "Alice"}`, `{"N": "30"}`, `{"M": {...}}` and so on. Numbers
//! travel as strings so no precision is lost in transit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RecordError, Result};

/// A record-level mapping from field name to typed node, e.g. `Keys` or `NewImage`.
pub type Record = BTreeMap<String, TypedNode>;

/// Wire tags.
pub mod tag {
    pub const NULL: &str = "NULL";
    pub const STRING: &str = "S";
    pub const BOOL: &str = "BOOL";
    pub const NUMBER: &str = "N";
    pub const MAP: &str = "M";
    pub const LIST: &str = "L";
    pub const BYTE_SET: &str = "BS";
    pub const STRING_SET: &str = "SS";
    pub const NUMBER_SET: &str = "NS";
}

/// One type-tagged value.
///
/// Tags this crate does not know (binary scalars among them) are kept as
/// [`TypedNode::Unrecognized`] so callers decide what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TypedNode {
    Null,
    String(String),
    Bool(bool),
    /// Number literal, verbatim.
    Number(String),
    Map(Record),
    List(Vec<TypedNode>),
    /// Base64-encoded binary members.
    ByteSet(Vec<String>),
    StringSet(Vec<String>),
    /// Number literals, verbatim.
    NumberSet(Vec<String>),
    Unrecognized { tag: String, payload: Value },
}

impl TypedNode {
    pub fn null() -> Self {
        TypedNode::Null
    }

    pub fn string(s: impl Into<String>) -> Self {
        TypedNode::String(s.into())
    }

    pub fn boolean(b: bool) -> Self {
        TypedNode::Bool(b)
    }

    pub fn number(literal: impl ToString) -> Self {
        TypedNode::Number(literal.to_string())
    }

    pub fn map<K: Into<String>>(fields: impl IntoIterator<Item = (K, TypedNode)>) -> Self {
        TypedNode::Map(
            fields
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    pub fn list(items: impl IntoIterator<Item = TypedNode>) -> Self {
        TypedNode::List(items.into_iter().collect())
    }

    pub fn string_set<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Self {
        TypedNode::StringSet(members.into_iter().map(Into::into).collect())
    }

    pub fn number_set<S: ToString>(members: impl IntoIterator<Item = S>) -> Self {
        TypedNode::NumberSet(members.into_iter().map(|m| m.to_string()).collect())
    }

    pub fn byte_set<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Self {
        TypedNode::ByteSet(members.into_iter().map(Into::into).collect())
    }

    /// Returns the wire tag of this node.
    pub fn tag(&self) -> &str {
        match self {
            TypedNode::Null => tag::NULL,
            TypedNode::String(_) => tag::STRING,
            TypedNode::Bool(_) => tag::BOOL,
            TypedNode::Number(_) => tag::NUMBER,
            TypedNode::Map(_) => tag::MAP,
            TypedNode::List(_) => tag::LIST,
            TypedNode::ByteSet(_) => tag::BYTE_SET,
            TypedNode::StringSet(_) => tag::STRING_SET,
            TypedNode::NumberSet(_) => tag::NUMBER_SET,
            TypedNode::Unrecognized { tag, .. } => tag,
        }
    }
}

/// Builds a [`Record`] from field/node pairs.
pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, TypedNode)>) -> Record {
    fields
        .into_iter()
        .map(|(name, node)| (name.into(), node))
        .collect()
}

fn malformed(tag: &str, expected: &str) -> RecordError {
    RecordError::MalformedNode(format!("'{tag}' payload must be {expected}"))
}

fn expect_string(tag: &str, payload: Value) -> Result<String> {
    match payload {
        Value::String(s) => Ok(s),
        _ => Err(malformed(tag, "a string")),
    }
}

fn expect_strings(tag: &str, payload: Value) -> Result<Vec<String>> {
    let Value::Array(items) = payload else {
        return Err(malformed(tag, "an array of strings"));
    };
    items
        .into_iter()
        .map(|item| expect_string(tag, item))
        .collect()
}

impl TryFrom<Value> for TypedNode {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(RecordError::MalformedNode(
                "typed node must be a JSON object".to_string(),
            ));
        };

        let mut entries = object.into_iter();
        let (Some((tag, payload)), None) = (entries.next(), entries.next()) else {
            return Err(RecordError::MalformedNode(
                "typed node must carry exactly one type tag".to_string(),
            ));
        };

        match tag.as_str() {
            tag::NULL => Ok(TypedNode::Null),
            tag::STRING => expect_string(&tag, payload).map(TypedNode::String),
            tag::BOOL => match payload {
                Value::Bool(b) => Ok(TypedNode::Bool(b)),
                _ => Err(malformed(&tag, "a boolean")),
            },
            tag::NUMBER => expect_string(&tag, payload).map(TypedNode::Number),
            tag::MAP => {
                let Value::Object(fields) = payload else {
                    return Err(malformed(&tag, "an object"));
                };
                fields
                    .into_iter()
                    .map(|(name, node)| Ok::<_, RecordError>((name, TypedNode::try_from(node)?)))
                    .collect::<Result<Record>>()
                    .map(TypedNode::Map)
            }
            tag::LIST => {
                let Value::Array(items) = payload else {
                    return Err(malformed(&tag, "an array"));
                };
                items
                    .into_iter()
                    .map(TypedNode::try_from)
                    .collect::<Result<Vec<_>>>()
                    .map(TypedNode::List)
            }
            tag::BYTE_SET => expect_strings(&tag, payload).map(TypedNode::ByteSet),
            tag::STRING_SET => expect_strings(&tag, payload).map(TypedNode::StringSet),
            tag::NUMBER_SET => expect_strings(&tag, payload).map(TypedNode::NumberSet),
            _ => Ok(TypedNode::Unrecognized { tag, payload }),
        }
    }
}

impl From<TypedNode> for Value {
    fn from(node: TypedNode) -> Self {
        let strings = |items: Vec<String>| Value::Array(items.into_iter().map(Value::String).collect());

        let (tag, payload) = match node {
            TypedNode::Null => (tag::NULL.to_string(), Value::Bool(true)),
            TypedNode::String(s) => (tag::STRING.to_string(), Value::String(s)),
            TypedNode::Bool(b) => (tag::BOOL.to_string(), Value::Bool(b)),
            TypedNode::Number(n) => (tag::NUMBER.to_string(), Value::String(n)),
            TypedNode::Map(fields) => (
                tag::MAP.to_string(),
                Value::Object(
                    fields
                        .into_iter()
                        .map(|(name, node)| (name, Value::from(node)))
                        .collect(),
                ),
            ),
            TypedNode::List(items) => (
                tag::LIST.to_string(),
                Value::Array(items.into_iter().map(Value::from).collect()),
            ),
            TypedNode::ByteSet(items) => (tag::BYTE_SET.to_string(), strings(items)),
            TypedNode::StringSet(items) => (tag::STRING_SET.to_string(), strings(items)),
            TypedNode::NumberSet(items) => (tag::NUMBER_SET.to_string(), strings(items)),
            TypedNode::Unrecognized { tag, payload } => (tag, payload),
        };

        let mut object = Map::new();
        object.insert(tag, payload);
        Value::Object(object)
    }
}
