//! Permanents - cards in play.
//!
//! `Permanent` tracks the mutable play state of a card on the battlefield.
//! Nothing here is an effective characteristic: power, toughness and
//! keywords are always computed by `StaticQuery` from the printed values
//! plus the modifiers recorded here.
//!
//! ## Weak references
//!
//! `attached_to` and `blocking_targets` hold ids, never ownership. When the
//! referent leaves play the link dangles until state-based actions clean it
//! up.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::Card;
use super::characteristics::{Color, KeywordSet};
use super::definition::CardDefinition;
use crate::core::{EntityId, PlayerId};

/// A card on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permanent {
    pub id: EntityId,

    /// The live card. May be a copy of another card's characteristics.
    pub card: Card,

    /// The card as it was before a copy effect replaced `card`.
    pub original_card: Option<Card>,

    pub controller: PlayerId,

    pub tapped: bool,
    pub attacking: bool,
    pub blocking: bool,

    /// Attackers this permanent blocks, in declaration order.
    pub blocking_targets: SmallVec<[EntityId; 2]>,

    /// Damage marked this turn.
    pub damage: i32,

    // Until-end-of-turn modifiers
    pub power_modifier: i32,
    pub toughness_modifier: i32,
    pub granted_keywords: KeywordSet,
    pub cant_be_blocked_this_turn: bool,
    pub cant_block_this_turn: bool,
    pub cant_regenerate: bool,
    pub animated: Option<(i32, i32)>,
    pub regeneration_shields: u32,
    pub prevention_shield: i32,

    pub plus_counters: i32,
    pub attached_to: Option<EntityId>,
    pub summoning_sick: bool,
    pub loyalty: i32,
    pub loyalty_used: bool,
    pub chosen_color: Option<Color>,
}

impl Permanent {
    /// Wrap a card that just entered the battlefield.
    ///
    /// Planeswalkers enter with their printed loyalty and no summoning
    /// sickness.
    #[must_use]
    pub fn new(id: EntityId, card: Card, controller: PlayerId) -> Self {
        let loyalty = card.definition.loyalty;
        Self {
            id,
            card,
            original_card: None,
            controller,
            tapped: false,
            attacking: false,
            blocking: false,
            blocking_targets: SmallVec::new(),
            damage: 0,
            power_modifier: 0,
            toughness_modifier: 0,
            granted_keywords: KeywordSet::empty(),
            cant_be_blocked_this_turn: false,
            cant_block_this_turn: false,
            cant_regenerate: false,
            animated: None,
            regeneration_shields: 0,
            prevention_shield: 0,
            plus_counters: 0,
            attached_to: None,
            summoning_sick: loyalty.is_none(),
            loyalty: loyalty.unwrap_or(0),
            loyalty_used: false,
            chosen_color: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.card.name()
    }

    #[must_use]
    pub fn definition(&self) -> &CardDefinition {
        &self.card.definition
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.card.owner
    }

    #[must_use]
    pub fn is_token(&self) -> bool {
        self.card.is_token
    }

    /// The card that goes to a zone when this permanent leaves play.
    #[must_use]
    pub fn into_card(self) -> Card {
        self.original_card.unwrap_or(self.card)
    }

    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.attacking || self.blocking
    }

    pub fn remove_from_combat(&mut self) {
        self.attacking = false;
        self.blocking = false;
        self.blocking_targets.clear();
    }

    /// Regenerate: tap, leave combat, clear damage.
    pub fn regenerate(&mut self) {
        self.regeneration_shields = self.regeneration_shields.saturating_sub(1);
        self.tapped = true;
        self.damage = 0;
        self.remove_from_combat();
    }

    #[must_use]
    pub fn can_regenerate(&self) -> bool {
        self.regeneration_shields > 0 && !self.cant_regenerate
    }

    /// Clear damage and everything that lasts "until end of turn".
    pub fn reset_end_of_turn(&mut self) {
        self.damage = 0;
        self.power_modifier = 0;
        self.toughness_modifier = 0;
        self.granted_keywords = KeywordSet::empty();
        self.cant_be_blocked_this_turn = false;
        self.cant_block_this_turn = false;
        self.cant_regenerate = false;
        self.animated = None;
        self.regeneration_shields = 0;
        self.prevention_shield = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Keyword;
    use std::sync::Arc;

    fn bears() -> Card {
        let def = CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2);
        Card::new(EntityId(10), PlayerId::new(0), Arc::new(def))
    }

    #[test]
    fn test_new_creature_is_summoning_sick() {
        let perm = Permanent::new(EntityId(11), bears(), PlayerId::new(0));
        assert!(perm.summoning_sick);
        assert_eq!(perm.name(), "Grizzly Bears");
        assert_eq!(perm.owner(), PlayerId::new(0));
    }

    #[test]
    fn test_planeswalker_enters_with_loyalty() {
        let def = CardDefinition::planeswalker("Chandra", "{2}{R}{R}".parse().unwrap(), 4);
        let card = Card::new(EntityId(3), PlayerId::new(1), Arc::new(def));
        let perm = Permanent::new(EntityId(4), card, PlayerId::new(1));
        assert_eq!(perm.loyalty, 4);
        assert!(!perm.summoning_sick);
    }

    #[test]
    fn test_regenerate() {
        let mut perm = Permanent::new(EntityId(11), bears(), PlayerId::new(0));
        perm.regeneration_shields = 1;
        perm.attacking = true;
        perm.damage = 5;
        assert!(perm.can_regenerate());

        perm.regenerate();
        assert!(perm.tapped);
        assert!(!perm.attacking);
        assert_eq!(perm.damage, 0);
        assert!(!perm.can_regenerate());
    }

    #[test]
    fn test_reset_end_of_turn_keeps_counters() {
        let mut perm = Permanent::new(EntityId(11), bears(), PlayerId::new(0));
        perm.power_modifier = 3;
        perm.plus_counters = 2;
        perm.granted_keywords.insert(Keyword::Flying);
        perm.damage = 1;

        perm.reset_end_of_turn();
        assert_eq!(perm.power_modifier, 0);
        assert_eq!(perm.damage, 0);
        assert!(perm.granted_keywords.is_empty());
        assert_eq!(perm.plus_counters, 2);
    }

    #[test]
    fn test_original_card_goes_to_zone() {
        let mut perm = Permanent::new(EntityId(11), bears(), PlayerId::new(0));
        let giant = Arc::new(CardDefinition::creature("Hill Giant", "{3}{R}".parse().unwrap(), 3, 3));
        let original = perm.card.clone();
        perm.card = original.with_definition(giant);
        perm.original_card = Some(original);

        assert_eq!(perm.name(), "Hill Giant");
        assert_eq!(perm.into_card().name(), "Grizzly Bears");
    }
}
