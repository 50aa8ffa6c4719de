//! Entities: the labeled values of short-text variables.

use serde::{Deserialize, Serialize};

use super::EntityRef;

/// Opaque entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity attached to a short-text variable (actor, concept, ...).
///
/// This is the catalog-side DTO: hosts hold entities per variable and embed
/// them into statement values via [`Entity::to_ref`]. The network core
/// identifies nodes by `label` alone; `in_database` only matters to an editor
/// deciding whether the entity persists without usages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub variable_id: u64,
    pub label: String,
    pub color: String,
    pub in_database: bool,
}

impl Entity {
    /// The statement-embeddable form of this entity.
    pub fn to_ref(&self) -> EntityRef {
        EntityRef { id: self.id, label: self.label.clone(), color: self.color.clone() }
    }
}
