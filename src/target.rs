//! Identity of anything a weapon or projectile can strike.
//!
//! The core never holds references to targets; it only remembers which
//! identities were already struck. Inside a Bevy world the identity is
//! the entity's bit pattern.

use bevy::prelude::Entity;
use serde::{Deserialize, Serialize};

/// Opaque identity of a hittable body (or of a wielder, for owner exclusion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl TargetId {
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Recover the Bevy entity this id was built from; `None` for ids that never were one.
    pub fn entity(self) -> Option<Entity> {
        Entity::try_from_bits(self.0).ok()
    }
}

impl From<Entity> for TargetId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_roundtrip() {
        let entity = Entity::from_raw(42);
        let id = TargetId::from(entity);
        assert_eq!(id.entity(), Some(entity));
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetId(7).to_string(), "#7");
    }
}
