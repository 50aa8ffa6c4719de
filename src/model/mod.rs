//! # Discourse Data Model
//!
//! Clean DTOs shared by every stage of the export pipeline.
//! These types cross every boundary: source ↔ filter ↔ builder ↔ optimizer.
//!
//! Design rule: pure data. No I/O, no locks, no RNG here. Statements and
//! documents are read-only snapshots loaded once per export run; `Matrix` is
//! immutable after construction; `BackboneResult` is frozen by the optimizer.

pub mod statement;
pub mod document;
pub mod entity;
pub mod matrix;
pub mod backbone;

pub use statement::{
    Statement, StatementId, CoderId, RoleValue, VariableValue, EntityRef,
};
pub use document::{Document, DocumentId};
pub use entity::{Entity, EntityId};
pub use matrix::Matrix;
pub use backbone::BackboneResult;
