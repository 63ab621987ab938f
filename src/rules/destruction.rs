//! Destroying permanents.
//!
//! "Destroy" is not "put into the graveyard": indestructible permanents
//! ignore it and a regeneration shield replaces it. Sacrifices and the
//! legend rule bypass both and call `GameState::dies` directly.

use crate::cards::Keyword;
use crate::core::{EntityId, GameState, Result};
use crate::statics::StaticQuery;

/// Destruction with indestructible and regeneration.
pub struct Destruction;

impl Destruction {
    /// Destroy a permanent. Returns true if it left the battlefield.
    pub fn destroy(state: &mut GameState, id: EntityId, no_regeneration: bool) -> Result<bool> {
        let perm = state.require_permanent(id)?;
        if StaticQuery::has_keyword(state, perm, Keyword::Indestructible) {
            let name = perm.name().to_string();
            state.log_event(format!("{name} is indestructible."));
            return Ok(false);
        }
        if !no_regeneration && perm.can_regenerate() {
            Self::regenerate(state, id)?;
            return Ok(false);
        }
        state.dies(id)?;
        Ok(true)
    }

    /// Use a regeneration shield: tap, clear damage, leave combat.
    pub fn regenerate(state: &mut GameState, id: EntityId) -> Result<()> {
        let perm = state.require_permanent_mut(id)?;
        perm.regenerate();
        let name = perm.name().to_string();
        state.combat.remove(id);
        state.log_event(format!("{name} regenerates."));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition};
    use crate::core::{EngineConfig, PlayerId};
    use std::sync::Arc;

    fn put(state: &mut GameState, def: CardDefinition) -> EntityId {
        let p0 = PlayerId::new(0);
        let card = Card::new(state.alloc_id(), p0, Arc::new(def));
        state.put_onto_battlefield(card, p0)
    }

    #[test]
    fn test_destroy() {
        let mut state = GameState::new(EngineConfig::default());
        let id = put(&mut state, CardDefinition::creature("Bears", "{1}{G}".parse().unwrap(), 2, 2));
        assert!(Destruction::destroy(&mut state, id, false).unwrap());
        assert!(state.permanent(id).is_none());
        assert_eq!(state.players[PlayerId::new(0)].graveyard.len(), 1);
    }

    #[test]
    fn test_indestructible_survives() {
        let mut state = GameState::new(EngineConfig::default());
        let def = CardDefinition::creature("Darksteel Myr", "{3}".parse().unwrap(), 0, 1)
            .with_keyword(Keyword::Indestructible);
        let id = put(&mut state, def);
        assert!(!Destruction::destroy(&mut state, id, true).unwrap());
        assert!(state.permanent(id).is_some());
    }

    #[test]
    fn test_regeneration_shield() {
        let mut state = GameState::new(EngineConfig::default());
        let id = put(&mut state, CardDefinition::creature("Drudge", "{B}".parse().unwrap(), 1, 1));
        {
            let perm = state.permanent_mut(id).unwrap();
            perm.regeneration_shields = 1;
            perm.damage = 3;
            perm.attacking = true;
        }
        assert!(!Destruction::destroy(&mut state, id, false).unwrap());
        let perm = state.permanent(id).unwrap();
        assert!(perm.tapped);
        assert!(!perm.attacking);
        assert_eq!(perm.damage, 0);
        assert_eq!(perm.regeneration_shields, 0);

        // "Can't be regenerated" ignores the next shield.
        state.permanent_mut(id).unwrap().regeneration_shields = 1;
        assert!(Destruction::destroy(&mut state, id, true).unwrap());
    }
}
