//! Document ID templates.
//!
//! A template such as `"{organization_id}|{group_id}"` is rendered against a
//! record's decoded key fields. `{{` and `}}` produce literal braces. Every
//! placeholder must resolve; there is no defaulting.

use std::str::FromStr;

use common::{Document, DocumentId};

use crate::decode::decode_record;
use crate::node::Record;
use crate::{RecordError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed document ID template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl KeyTemplate {
    /// Parses a template string.
    ///
    /// Fails with [`RecordError::Config`] if the template is empty or its
    /// braces do not form valid placeholders.
    pub fn parse(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err(RecordError::Config(
                "no document ID template specified".to_string(),
            ));
        }

        let invalid = |reason: &str| {
            RecordError::Config(format!("invalid document ID template '{template}': {reason}"))
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(invalid("unterminated placeholder")),
                            Some(ch) => field.push(ch),
                        }
                    }
                    if field.is_empty() {
                        return Err(invalid("empty placeholder"));
                    }
                    if field.contains([':', '!', '[', '.']) {
                        return Err(invalid("placeholders must name a key field only"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(invalid("single '}' encountered")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Returns the template string as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the key field names the template references, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Renders the template against already-decoded key fields.
    pub fn render(&self, keys: &Document) -> Result<DocumentId> {
        let mut id = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => id.push_str(text),
                Segment::Field(name) => {
                    let value = keys.get(name).ok_or_else(|| RecordError::Template {
                        field: name.clone(),
                    })?;
                    id.push_str(&value.to_string());
                }
            }
        }
        Ok(DocumentId::new(id))
    }

    /// Decodes a record's key fields and renders the template against them.
    pub fn resolve(&self, keys: &Record) -> Result<DocumentId> {
        self.render(&decode_record(keys)?)
    }
}

impl FromStr for KeyTemplate {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses `template` and renders it against the decoded `keys`.
pub fn resolve(template: &str, keys: &Record) -> Result<DocumentId> {
    KeyTemplate::parse(template)?.resolve(keys)
}
