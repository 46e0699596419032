use serde::{Deserialize, Serialize};

/// Name of a collection (index) in the document store.
///
/// Collection names are always lower-case; the constructor normalizes
/// whatever it is given so two spellings of the same table never end up
/// in different collections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a collection name, lower-casing the input.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_lowercase())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CollectionName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CollectionName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

/// External identifier of a document inside a collection.
///
/// Derived from a record's key fields; see the key template in `change-record`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_is_lower_cased() {
        let name = CollectionName::new("MyTable");
        assert_eq!(name.as_str(), "mytable");
        assert_eq!(name, CollectionName::from("MYTABLE"));
    }

    #[test]
    fn document_id_preserves_value() {
        let id = DocumentId::new("42|7");
        assert_eq!(id.as_str(), "42|7");
        assert_eq!(id.to_string(), "42|7");
        assert_eq!(String::from(id), "42|7");
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let json = serde_json::to_string(&DocumentId::new("a-1")).unwrap();
        assert_eq!(json, "\"a-1\"");

        let name: CollectionName = serde_json::from_str("\"Orders\"").unwrap();
        assert_eq!(name.as_str(), "orders");
    }
}
