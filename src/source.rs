//! # Statement Source Trait
//!
//! This is THE contract between the export engine and whatever store holds
//! the coded statements. The engine never talks SQL and never sees a
//! connection profile; it receives plain in-memory snapshots.
//!
//! | Source | Description |
//! |--------|-------------|
//! | `MemorySource` | In-memory snapshots for testing/embedding |
//! | (external) | Database-backed sources implement the trait in the host app |

use crate::model::{Document, Statement};
use crate::Result;

/// Read-only access to the statement/document universe of one export run.
///
/// Implementations return snapshots: the engine assumes the data does not
/// change between calls within a run.
pub trait StatementSource {
    /// All statements of the given statement type, any filter applied later.
    fn statements(&self, statement_type_id: u64) -> Result<Vec<Statement>>;

    /// The full statement universe, regardless of type. Needed for isolate
    /// node labels, which must stay stable across differently filtered runs.
    fn all_statements(&self) -> Result<Vec<Statement>>;

    /// Metadata of every document (author/source/section/type/date).
    fn documents(&self) -> Result<Vec<Document>>;
}

// ============================================================================
// MemorySource
// ============================================================================

/// In-memory statement store. The reference `StatementSource` implementation,
/// used by tests and by hosts that already hold their data in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    statements: Vec<Statement>,
    documents: Vec<Document>,
}

impl MemorySource {
    pub fn new(statements: Vec<Statement>, documents: Vec<Document>) -> Self {
        Self { statements, documents }
    }

    pub fn push_statement(&mut self, s: Statement) {
        self.statements.push(s);
    }

    pub fn push_document(&mut self, d: Document) {
        self.documents.push(d);
    }
}

impl StatementSource for MemorySource {
    fn statements(&self, statement_type_id: u64) -> Result<Vec<Statement>> {
        Ok(self
            .statements
            .iter()
            .filter(|s| s.statement_type_id == statement_type_id)
            .cloned()
            .collect())
    }

    fn all_statements(&self) -> Result<Vec<Statement>> {
        Ok(self.statements.clone())
    }

    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}
