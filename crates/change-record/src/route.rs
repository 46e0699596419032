//! Collection routing from a change record's source identifier.

use std::sync::LazyLock;

use common::CollectionName;
use regex::Regex;

use crate::{RecordError, Result};

// arn:aws:dynamodb:<region>:<account>:table/<NAME>/stream/<label>
static SOURCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws:dynamodb:.*?:.*?:table/([0-9a-zA-Z_-]+)/.+")
        .expect("source pattern is a valid regex")
});

/// Resolves the target collection from a stream source identifier.
///
/// The table name is lower-cased. Identifiers that do not name a table fail
/// with [`RecordError::Routing`].
pub fn resolve_collection(source: &str) -> Result<CollectionName> {
    SOURCE_PATTERN
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|table| CollectionName::new(table.as_str()))
        .ok_or_else(|| RecordError::Routing(source.to_string()))
}
