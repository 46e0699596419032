//! Application configuration loaded from environment variables.

use projector::{DEFAULT_DOCUMENT_TYPE, ProjectorConfig};

/// Gateway configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `ELASTIC_SEARCH_ENDPOINT`: search cluster URL (default: `"http://localhost:9200"`)
/// - `ES_INDEX_DOC_TYPE`: document type label (default: `"doc"`)
/// - `ES_DOCUMENT_ID_TEMPLATE`: document ID template, e.g.
///   `"{organization_id}|{group_id}"`. No default; every event fails while unset.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub elastic_search_endpoint: String,
    pub document_type: String,
    pub id_template: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            elastic_search_endpoint: lookup("ELASTIC_SEARCH_ENDPOINT")
                .unwrap_or(defaults.elastic_search_endpoint),
            document_type: lookup("ES_INDEX_DOC_TYPE")
                .filter(|t| !t.is_empty())
                .unwrap_or(defaults.document_type),
            id_template: lookup("ES_DOCUMENT_ID_TEMPLATE").unwrap_or(defaults.id_template),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the projector settings.
    pub fn projector_config(&self) -> ProjectorConfig {
        ProjectorConfig::new(self.id_template.as_str())
            .with_document_type(self.document_type.as_str())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            elastic_search_endpoint: "http://localhost:9200".to_string(),
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            id_template: String::new(),
        }
    }
}
