//! Combat.
//!
//! ## Key Types
//!
//! - `CombatState`: Attackers and block assignments for the current combat
//! - `Combat`: Declaration validation and the two-phase damage resolver
//!
//! Combat assignments are ids. A creature that leaves play (or regenerates)
//! is removed from them, but an attacker that was blocked stays blocked
//! even if every blocker is gone.

mod damage;
mod declare;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::EntityId;

pub use declare::Combat;

/// Who is attacking and who blocks whom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Attackers in declaration order.
    pub attackers: Vec<EntityId>,
    /// (blocker, attacker) pairs in declaration order.
    pub blocks: Vec<(EntityId, EntityId)>,
    /// Attackers that were blocked.
    pub blocked: Vec<EntityId>,
}

impl CombatState {
    /// Forget a permanent that left combat.
    pub fn remove(&mut self, id: EntityId) {
        self.attackers.retain(|a| *a != id);
        self.blocks.retain(|(b, a)| *b != id && *a != id);
        self.blocked.retain(|a| *a != id);
    }

    #[must_use]
    pub fn is_attacking(&self, id: EntityId) -> bool {
        self.attackers.contains(&id)
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: EntityId) -> bool {
        self.blocked.contains(&attacker)
    }

    /// Blockers of an attacker, in the order they were declared.
    #[must_use]
    pub fn blockers_of(&self, attacker: EntityId) -> SmallVec<[EntityId; 2]> {
        self.blocks
            .iter()
            .filter(|(_, a)| *a == attacker)
            .map(|(b, _)| *b)
            .collect()
    }

    /// Attackers a creature blocks.
    #[must_use]
    pub fn blocked_by(&self, blocker: EntityId) -> SmallVec<[EntityId; 2]> {
        self.blocks
            .iter()
            .filter(|(b, _)| *b == blocker)
            .map(|(_, a)| *a)
            .collect()
    }

    /// Every blocker, once each, in declaration order.
    #[must_use]
    pub fn blockers(&self) -> Vec<EntityId> {
        let mut blockers: Vec<EntityId> = Vec::new();
        for (b, _) in &self.blocks {
            if !blockers.contains(b) {
                blockers.push(*b);
            }
        }
        blockers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attackers.is_empty() && self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_attacker_stays_blocked() {
        let mut combat = CombatState {
            attackers: vec![EntityId(10)],
            blocks: vec![(EntityId(20), EntityId(10)), (EntityId(21), EntityId(10))],
            blocked: vec![EntityId(10)],
        };
        assert_eq!(combat.blockers_of(EntityId(10)).as_slice(), &[EntityId(20), EntityId(21)]);

        combat.remove(EntityId(20));
        combat.remove(EntityId(21));
        assert!(combat.blockers_of(EntityId(10)).is_empty());
        assert!(combat.is_blocked(EntityId(10)));

        combat.remove(EntityId(10));
        assert!(combat.is_empty());
    }

    #[test]
    fn test_blockers_are_unique() {
        let combat = CombatState {
            attackers: vec![EntityId(10), EntityId(11)],
            blocks: vec![(EntityId(20), EntityId(10)), (EntityId(20), EntityId(11))],
            blocked: vec![EntityId(10), EntityId(11)],
        };
        assert_eq!(combat.blockers(), vec![EntityId(20)]);
        assert_eq!(combat.blocked_by(EntityId(20)).len(), 2);
    }
}
