//! A coded statement, the atomic relational event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::EntityId;

/// Opaque statement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementId(pub u64);

impl std::fmt::Display for StatementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque coder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoderId(pub u64);

/// Reference to an entity as stored inside a statement value.
///
/// Carries the label and color redundantly so the core never has to resolve
/// entity ids against the store mid-export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub label: String,
    pub color: String,
}

/// One variable slot of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableValue {
    /// Short-text variable holding an entity reference (actor, concept, ...).
    Entity(EntityRef),
    /// Free-form long text.
    LongText(String),
    /// Integer qualifier (e.g. an agreement scale).
    Int(i64),
    /// Binary qualifier (e.g. support / opposition).
    Bool(bool),
}

impl VariableValue {
    /// The string identity of this value when used as a node label.
    /// Long text and numeric values stringify; empty entity labels stay empty.
    pub fn label(&self) -> String {
        match self {
            VariableValue::Entity(e) => e.label.clone(),
            VariableValue::LongText(s) => s.clone(),
            VariableValue::Int(i) => i.to_string(),
            VariableValue::Bool(b) => if *b { "1".into() } else { "0".into() },
        }
    }

    /// Qualifier level as an integer: booleans map to 0/1, ints pass through.
    pub fn qualifier_level(&self) -> Option<i64> {
        match self {
            VariableValue::Bool(b) => Some(i64::from(*b)),
            VariableValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VariableValue::Entity(e) => e.label.is_empty(),
            VariableValue::LongText(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// A named value slot inside a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleValue {
    pub variable: String,
    pub value: VariableValue,
}

/// A coded relational event: entities and qualifiers tied to a document
/// position and timestamp. Immutable once loaded for an export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub statement_type_id: u64,
    pub document_id: super::DocumentId,
    pub time: DateTime<Utc>,
    pub coder_id: CoderId,
    /// Ordered variable slots, as defined by the statement type.
    pub values: SmallVec<[RoleValue; 4]>,
}

impl Statement {
    /// Look up the value of a statement-level variable by name.
    pub fn value(&self, variable: &str) -> Option<&VariableValue> {
        self.values
            .iter()
            .find(|rv| rv.variable == variable)
            .map(|rv| &rv.value)
    }

    /// Label of a statement-level variable, or `None` if absent/empty.
    pub fn label_of(&self, variable: &str) -> Option<String> {
        self.value(variable)
            .filter(|v| !v.is_empty())
            .map(VariableValue::label)
    }
}
