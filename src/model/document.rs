//! Document metadata for the statements' source texts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata of a source document. The core only reads the descriptive
/// fields; text content stays in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub author: String,
    pub source: String,
    pub section: String,
    /// Document type (named `kind` to avoid the keyword).
    pub kind: String,
    pub notes: String,
    pub time: DateTime<Utc>,
}

impl Document {
    /// Value of a document-level field by the name the filter/exporter uses.
    /// Unknown fields resolve to `None`, not an error.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "author" => Some(&self.author),
            "source" => Some(&self.source),
            "section" => Some(&self.section),
            "type" => Some(&self.kind),
            "notes" => Some(&self.notes),
            _ => None,
        }
    }
}
