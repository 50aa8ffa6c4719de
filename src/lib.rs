//! # dna-rs: Discourse Network Construction & Backbone Extraction
//!
//! Turns coded relational events ("statements": actor/concept/qualifier
//! tuples tied to a document and timestamp) into weighted one-mode and
//! two-mode networks, and optionally reduces a one-mode network to a minimal
//! "backbone" that reproduces its spectral structure.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `StatementSource` is the contract between the engine
//!    and whatever store holds the coded statements
//! 2. **Clean DTOs**: `Statement`, `Document`, `Matrix`, `BackboneResult`
//!    cross all boundaries
//! 3. **No ambient state**: every knob (variables, qualifier handling,
//!    duplicates, exclusions, penalty, seed) is an explicit field of
//!    [`ExportSpec`] / [`BackboneSpec`]
//! 4. **Caller owns the loop**: the annealing optimizer exposes a single-step
//!    API plus a cancel-aware driver; no UI thread model is baked in
//!
//! ## Pipeline
//!
//! ```text
//! StatementSource → filter → (labels ∥ builder) → Matrix → BackboneOptimizer
//!                                                    │            │
//!                                                    ▼            ▼
//!                                              CSV/DL/GraphML  XML/JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dna_rs::{ExportPipeline, ExportSpec, MemorySource, NetworkMode};
//!
//! # fn example(source: MemorySource) -> dna_rs::Result<()> {
//! let spec = ExportSpec {
//!     statement_type_id: 1,
//!     variable1: "organization".into(),
//!     variable2: "concept".into(),
//!     qualifier: Some("agreement".into()),
//!     mode: NetworkMode::TwoMode,
//!     ..ExportSpec::default()
//! };
//! let network = ExportPipeline::new(spec)?.run(&source)?;
//! println!("{} x {}", network.matrix.row_labels.len(), network.matrix.col_labels.len());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod source;
pub mod filter;
pub mod labels;
pub mod builder;
pub mod backbone;
pub mod export;
pub mod pipeline;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Statement, Document, Entity, EntityRef, RoleValue, VariableValue,
    StatementId, DocumentId, EntityId, CoderId,
    Matrix, BackboneResult,
};

// ============================================================================
// Re-exports: Source
// ============================================================================

pub use source::{StatementSource, MemorySource};

// ============================================================================
// Re-exports: Filter / Builder configuration
// ============================================================================

pub use filter::{FilterSpec, Duplicates, ExclusionSpec};
pub use builder::{QualifierAggregation, Normalization, NetworkMode};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use pipeline::{ExportPipeline, ExportSpec, NetworkExport};

// ============================================================================
// Re-exports: Backbone
// ============================================================================

pub use backbone::{BackboneOptimizer, BackboneSpec, ProgressHandle};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// var1 and var2 must index different dimensions of the network.
    #[error("Configuration error: variable 1 and variable 2 are both '{0}'")]
    SameVariables(String),

    /// A mode combination the engine does not compute (e.g. backbone with a
    /// moving time window).
    #[error("Unsupported configuration: {0}")]
    UnsupportedCombination(String),

    #[error("Configuration error: {0}")]
    InvalidSpec(String),

    /// No statement survived filtering. The caller decides whether to relax
    /// the filters; this is never retried internally.
    #[error("No statements left after filtering (statement type {statement_type_id})")]
    EmptyFilterResult { statement_type_id: u64 },

    /// The backbone optimizer needs a symmetric one-mode network with at
    /// least two non-isolated nodes.
    #[error("Backbone precondition failed: {0}")]
    BackbonePrecondition(String),

    #[error("Source error: {0}")]
    SourceError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
