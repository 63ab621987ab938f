//! Game events that can trigger abilities.
//!
//! An event names the moment; which abilities fire is decided by the
//! effect slot it maps to on the permanents (or dead card) involved.

use crate::cards::{Card, EffectSlot};
use crate::core::{EntityId, PlayerId};

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    EnteredBattlefield(EntityId),
    Attacked(EntityId),
    Blocked(EntityId),
    /// The permanent is gone; the card it left behind carries the trigger.
    Died { card: Card, controller: PlayerId },
    /// Beginning of `PlayerId`'s upkeep.
    Upkeep(PlayerId),
    /// Beginning of `PlayerId`'s draw step, after the draw.
    DrawStep(PlayerId),
    /// Beginning of the end step. Both players' permanents trigger.
    EndStep,
    CombatDamageToPlayer { source: EntityId },
}

impl GameEvent {
    /// The card slot whose effects this event fires.
    #[must_use]
    pub const fn slot(&self) -> EffectSlot {
        match self {
            GameEvent::EnteredBattlefield(_) => EffectSlot::OnEnter,
            GameEvent::Attacked(_) => EffectSlot::OnAttack,
            GameEvent::Blocked(_) => EffectSlot::OnBlock,
            GameEvent::Died { .. } => EffectSlot::OnDeath,
            GameEvent::Upkeep(_) => EffectSlot::Upkeep,
            GameEvent::DrawStep(_) => EffectSlot::DrawStep,
            GameEvent::EndStep => EffectSlot::EndStep,
            GameEvent::CombatDamageToPlayer { .. } => EffectSlot::OnCombatDamageToPlayer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        assert_eq!(GameEvent::EnteredBattlefield(EntityId(5)).slot(), EffectSlot::OnEnter);
        assert_eq!(GameEvent::EndStep.slot(), EffectSlot::EndStep);
        assert_eq!(
            GameEvent::CombatDamageToPlayer { source: EntityId(5) }.slot(),
            EffectSlot::OnCombatDamageToPlayer
        );
    }
}
