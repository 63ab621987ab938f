//! Moving cards between zones.
//!
//! Every change of zone goes through these methods so that the same
//! bookkeeping happens everywhere: a permanent leaving play drops out of
//! combat and control-change records, tokens cease to exist, the original
//! (not copied) card goes to its owner, and dying fires death triggers.

use super::{Zone, ZonePosition};
use crate::cards::{Card, Permanent};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::triggers::{GameEvent, Triggers};

impl GameState {
    /// Put a card onto the battlefield under `controller`. Returns the new
    /// permanent's id.
    pub fn put_onto_battlefield(&mut self, card: Card, controller: PlayerId) -> EntityId {
        let id = self.alloc_id();
        self.log_event(format!("{} enters the battlefield.", card.name()));
        self.players[controller]
            .battlefield
            .push(Permanent::new(id, card, controller));
        Triggers::fire(self, GameEvent::EnteredBattlefield(id));
        id
    }

    /// Take a permanent off the battlefield without putting it anywhere.
    pub fn remove_permanent(&mut self, id: EntityId) -> Result<Permanent> {
        let (controller, index) = self
            .locate_permanent(id)
            .ok_or_else(|| EngineError::invariant(format!("permanent {id} is not on the battlefield")))?;
        let perm = self.players[controller].battlefield.remove(index);
        self.combat.remove(id);
        self.control_changes.remove(&id);
        for (_, board) in self.players.iter_mut() {
            for other in &mut board.battlefield {
                other.blocking_targets.retain(|a| *a != id);
            }
        }
        Ok(perm)
    }

    /// Move a permanent to its owner's graveyard, hand, exile or library.
    pub fn move_permanent(&mut self, id: EntityId, zone: Zone, position: ZonePosition) -> Result<()> {
        if matches!(zone, Zone::Battlefield | Zone::Stack) {
            return Err(EngineError::invariant(format!(
                "cannot move a permanent to the {zone:?} zone"
            )));
        }
        let perm = self.remove_permanent(id)?;
        let controller = perm.controller;
        let owner = perm.owner();
        let name = perm.name().to_string();
        let is_token = perm.is_token();
        let card = perm.into_card();

        match zone {
            Zone::Graveyard => self.log_event(format!("{name} is put into the graveyard.")),
            Zone::Hand => self.log_event(format!("{name} returns to {owner}'s hand.")),
            Zone::Exile => self.log_event(format!("{name} is exiled.")),
            Zone::Library | Zone::Battlefield | Zone::Stack => {
                self.log_event(format!("{name} is put into {owner}'s library."));
            }
        }

        if zone == Zone::Graveyard {
            Triggers::fire(self, GameEvent::Died { card: card.clone(), controller });
        }

        if !is_token {
            self.put_card(card, zone, position)?;
        }
        Ok(())
    }

    /// Put a card from the battlefield into its owner's graveyard.
    pub fn dies(&mut self, id: EntityId) -> Result<()> {
        self.move_permanent(id, Zone::Graveyard, ZonePosition::Top)
    }

    /// Sacrifice a permanent. Ignores indestructible and regeneration.
    pub fn sacrifice(&mut self, id: EntityId) -> Result<()> {
        let perm = self.require_permanent(id)?;
        let message = format!("{} sacrifices {}.", perm.controller, perm.name());
        self.log_event(message);
        self.dies(id)
    }

    /// Take a card out of whichever graveyard holds it.
    pub fn take_graveyard_card(&mut self, id: EntityId) -> Option<Card> {
        self.players
            .iter_mut()
            .find_map(|(_, board)| board.graveyard.remove_id(id))
    }

    /// Put a card that is not on the battlefield into its owner's pile.
    pub fn put_card(&mut self, card: Card, zone: Zone, position: ZonePosition) -> Result<()> {
        let board = &mut self.players[card.owner];
        match zone {
            Zone::Library => board.library.put(card, position),
            Zone::Hand => board.hand.push(card),
            Zone::Graveyard => board.graveyard.push(card),
            Zone::Exile => board.exile.push(card),
            Zone::Battlefield | Zone::Stack => {
                return Err(EngineError::invariant(format!(
                    "cards enter the {zone:?} zone through their own paths"
                )));
            }
        }
        Ok(())
    }

    /// Draw one card. Drawing from an empty library is remembered and loses
    /// the game at the next state-based check.
    pub fn draw_card(&mut self, player: PlayerId) -> Option<EntityId> {
        let board = &mut self.players[player];
        match board.library.take_top() {
            Some(card) => {
                let id = card.id;
                board.hand.push(card);
                Some(id)
            }
            None => {
                board.drew_from_empty = true;
                None
            }
        }
    }

    pub fn draw_cards(&mut self, player: PlayerId, count: usize) {
        if count == 0 {
            return;
        }
        let drawn = (0..count).filter(|_| self.draw_card(player).is_some()).count();
        self.log_event(format!(
            "{player} draws {drawn} card{}.",
            if drawn == 1 { "" } else { "s" }
        ));
    }

    /// Discard a card from hand by index.
    pub fn discard(&mut self, player: PlayerId, hand_index: usize) -> Result<()> {
        let card = self.players[player]
            .hand
            .remove(hand_index)
            .ok_or(EngineError::InvalidIndex { what: "hand", index: hand_index })?;
        self.log_event(format!("{player} discards {}.", card.name()));
        self.players[card.owner].graveyard.push(card);
        Ok(())
    }

    /// Put the top `count` cards of a library into its graveyard.
    pub fn mill(&mut self, player: PlayerId, count: usize) {
        let board = &mut self.players[player];
        let mut milled = 0;
        while milled < count {
            let Some(card) = board.library.take_top() else {
                break;
            };
            board.graveyard.push(card);
            milled += 1;
        }
        self.log_event(format!("{player} mills {milled} card(s)."));
    }

    /// Move a permanent to another player's battlefield. It keeps its id and
    /// leaves combat.
    pub fn change_control(&mut self, id: EntityId, controller: PlayerId) -> Result<()> {
        let (current, index) = self
            .locate_permanent(id)
            .ok_or_else(|| EngineError::invariant(format!("permanent {id} is not on the battlefield")))?;
        if current == controller {
            return Ok(());
        }
        let mut perm = self.players[current].battlefield.remove(index);
        self.combat.remove(id);
        perm.remove_from_combat();
        perm.controller = controller;
        perm.summoning_sick = true;
        self.log_event(format!("{controller} gains control of {}.", perm.name()));
        self.players[controller].battlefield.push(perm);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::EngineConfig;
    use std::sync::Arc;

    fn bears(state: &mut GameState, owner: PlayerId) -> Card {
        let def = Arc::new(CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2));
        Card::new(state.alloc_id(), owner, def)
    }

    #[test]
    fn test_stolen_permanent_returns_to_owner() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let card = bears(&mut state, p0);
        let id = state.put_onto_battlefield(card, p0);

        state.change_control(id, p1).unwrap();
        assert!(state.players[p0].battlefield.is_empty());
        assert_eq!(state.permanent(id).unwrap().controller, p1);

        state.dies(id).unwrap();
        assert_eq!(state.players[p0].graveyard.len(), 1);
        assert!(state.players[p1].graveyard.is_empty());
    }

    #[test]
    fn test_tokens_vanish() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let def = Arc::new(CardDefinition::creature("Soldier", "{0}".parse().unwrap(), 1, 1));
        let token = Card::token(state.alloc_id(), p0, def);
        let id = state.put_onto_battlefield(token, p0);

        state.move_permanent(id, Zone::Hand, ZonePosition::Top).unwrap();
        assert!(state.players[p0].hand.is_empty());
        assert!(state.permanent(id).is_none());
    }

    #[test]
    fn test_draw_from_empty_library_is_flagged() {
        let mut state = GameState::new(EngineConfig::default());
        let p1 = PlayerId::new(1);
        assert!(state.draw_card(p1).is_none());
        assert!(state.players[p1].drew_from_empty);
    }

    #[test]
    fn test_cannot_move_to_stack() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let card = bears(&mut state, p0);
        let id = state.put_onto_battlefield(card, p0);
        let err = state.move_permanent(id, Zone::Stack, ZonePosition::Top).unwrap_err();
        assert!(!err.is_illegal_action());
    }
}
