//! Dealing damage.
//!
//! All damage, combat or not, goes through [`Damage`]. In order:
//!
//! 1. the global damage multiplier;
//! 2. colors prevented this turn and protection (prevent everything);
//! 3. the game-wide "next N damage" shield;
//! 4. the recipient's own prevention shield.
//!
//! Whatever is left is marked on a creature, removed from a planeswalker's
//! loyalty, or subtracted from a player's life. Lifelink sources gain their
//! controller that much life. Marked damage is not acted on here; lethal
//! damage is a state-based action (or, in combat, a casualty check).

use crate::cards::{Card, CardType, Color, Keyword, Permanent};
use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::effects::Target;
use crate::statics::StaticQuery;

/// Who is dealing damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageSource {
    /// The source permanent, if the damage comes from one.
    pub id: Option<EntityId>,
    pub controller: PlayerId,
    pub color: Option<Color>,
    pub lifelink: bool,
    pub name: String,
}

impl DamageSource {
    /// A permanent on the battlefield, with its current characteristics.
    #[must_use]
    pub fn from_permanent(state: &GameState, perm: &Permanent) -> Self {
        let chars = StaticQuery::characteristics(state, perm);
        Self {
            id: Some(perm.id),
            controller: perm.controller,
            color: chars.color,
            lifelink: chars.keywords.contains(Keyword::Lifelink),
            name: perm.name().to_string(),
        }
    }

    /// A spell, or an ability whose source is gone.
    #[must_use]
    pub fn from_card(card: &Card, controller: PlayerId) -> Self {
        Self {
            id: None,
            controller,
            color: card.definition.color,
            lifelink: card.definition.keywords.contains(Keyword::Lifelink),
            name: card.name().to_string(),
        }
    }
}

/// Damage application.
pub struct Damage;

impl Damage {
    /// Damage to whatever a target names. Spells and graveyard cards cannot
    /// be damaged.
    pub fn to_target(state: &mut GameState, source: &DamageSource, target: Target, amount: i32) -> Result<i32> {
        match target {
            Target::Player(player) => Ok(Self::to_player(state, source, player, amount)),
            Target::Permanent(id) => Self::to_permanent(state, source, id, amount),
            Target::GraveyardCard(_) | Target::Spell(_) => Ok(0),
        }
    }

    /// Damage to a creature or planeswalker. Returns the amount dealt.
    pub fn to_permanent(state: &mut GameState, source: &DamageSource, id: EntityId, amount: i32) -> Result<i32> {
        let perm = state.require_permanent(id)?;
        let protected = StaticQuery::protection(state, perm).contains_opt(source.color);
        let is_creature = StaticQuery::is_creature(state, perm);
        let is_planeswalker = perm.definition().has_type(CardType::Planeswalker);

        let mut dealt = Self::modified(state, source, amount, protected);
        let perm = state.require_permanent_mut(id)?;
        dealt = absorb(&mut perm.prevention_shield, dealt);
        if dealt <= 0 {
            return Ok(0);
        }
        if is_creature {
            perm.damage += dealt;
        } else if is_planeswalker {
            perm.loyalty -= dealt;
        }
        let name = perm.name().to_string();
        state.log_event(format!("{} deals {dealt} damage to {name}.", source.name));
        Self::lifelink(state, source, dealt);
        Ok(dealt)
    }

    /// Damage to a player. Returns the amount dealt.
    pub fn to_player(state: &mut GameState, source: &DamageSource, player: PlayerId, amount: i32) -> i32 {
        let mut dealt = Self::modified(state, source, amount, false);
        dealt = absorb(&mut state.players[player].prevention_shield, dealt);
        if dealt <= 0 {
            return 0;
        }
        state.players[player].life -= dealt;
        state.log_event(format!("{} deals {dealt} damage to {player}.", source.name));
        Self::lifelink(state, source, dealt);
        dealt
    }

    /// Multiplier, then color prevention and protection, then the global
    /// shield.
    fn modified(state: &mut GameState, source: &DamageSource, amount: i32, protected: bool) -> i32 {
        if amount <= 0 {
            return 0;
        }
        if protected || state.prevention.colors.contains_opt(source.color) {
            state.log_event(format!("Damage from {} is prevented.", source.name));
            return 0;
        }
        let amount = amount.saturating_mul(StaticQuery::damage_multiplier(state));
        absorb(&mut state.prevention.next_damage, amount)
    }

    fn lifelink(state: &mut GameState, source: &DamageSource, dealt: i32) {
        if source.lifelink {
            state.gain_life(source.controller, dealt);
        }
    }
}

/// Use up a prevention shield against `amount`. Returns what gets through.
fn absorb(shield: &mut i32, amount: i32) -> i32 {
    let prevented = amount.min(*shield).max(0);
    *shield -= prevented;
    amount - prevented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, ColorSet};
    use crate::core::EngineConfig;
    use crate::effects::StaticEffect;
    use std::sync::Arc;

    fn put(state: &mut GameState, def: CardDefinition, controller: PlayerId) -> EntityId {
        let card = Card::new(state.alloc_id(), controller, Arc::new(def));
        state.put_onto_battlefield(card, controller)
    }

    fn bolt_source(controller: PlayerId) -> DamageSource {
        let def = CardDefinition::instant("Lightning Bolt", "{R}".parse().unwrap());
        DamageSource::from_card(&Card::new(EntityId(99), controller, Arc::new(def)), controller)
    }

    #[test]
    fn test_absorb() {
        let mut shield = 2;
        assert_eq!(absorb(&mut shield, 3), 1);
        assert_eq!(shield, 0);
        let mut shield = 5;
        assert_eq!(absorb(&mut shield, 3), 0);
        assert_eq!(shield, 2);
    }

    #[test]
    fn test_damage_marks_creature() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let id = put(&mut state, CardDefinition::creature("Bears", "{1}{G}".parse().unwrap(), 2, 2), p0);

        let dealt = Damage::to_permanent(&mut state, &bolt_source(PlayerId::new(1)), id, 3).unwrap();
        assert_eq!(dealt, 3);
        assert_eq!(state.permanent(id).unwrap().damage, 3);
        assert_eq!(state.log.back().map(String::as_str), Some("Lightning Bolt deals 3 damage to Bears."));
    }

    #[test]
    fn test_protection_prevents() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let knight = CardDefinition::creature("Knight", "{W}{W}".parse().unwrap(), 2, 2)
            .with_static(StaticEffect::ProtectionFromColors { colors: ColorSet::of(&[Color::Red]) });
        let id = put(&mut state, knight, p0);

        let dealt = Damage::to_permanent(&mut state, &bolt_source(PlayerId::new(1)), id, 3).unwrap();
        assert_eq!(dealt, 0);
        assert_eq!(state.permanent(id).unwrap().damage, 0);
    }

    #[test]
    fn test_shields_and_multiplier() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        put(
            &mut state,
            CardDefinition::enchantment("Furnace", "{3}{R}".parse().unwrap()).with_static(StaticEffect::DoubleDamage),
            p0,
        );
        state.prevention.next_damage = 1;
        state.players[p1].prevention_shield = 2;

        // 3 doubled to 6, minus 1 global, minus 2 on the player.
        let dealt = Damage::to_player(&mut state, &bolt_source(p0), p1, 3);
        assert_eq!(dealt, 3);
        assert_eq!(state.players[p1].life, 17);
        assert_eq!(state.prevention.next_damage, 0);
        assert_eq!(state.players[p1].prevention_shield, 0);
    }

    #[test]
    fn test_planeswalker_loses_loyalty() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let id = put(&mut state, CardDefinition::planeswalker("Chandra", "{4}{R}".parse().unwrap(), 4), p0);
        Damage::to_permanent(&mut state, &bolt_source(PlayerId::new(1)), id, 3).unwrap();
        let walker = state.permanent(id).unwrap();
        assert_eq!(walker.loyalty, 1);
        assert_eq!(walker.damage, 0);
    }

    #[test]
    fn test_lifelink() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let id = put(
            &mut state,
            CardDefinition::creature("Vampire", "{1}{B}".parse().unwrap(), 2, 2).with_keyword(Keyword::Lifelink),
            p0,
        );
        let source = DamageSource::from_permanent(&state, state.permanent(id).unwrap());
        Damage::to_player(&mut state, &source, PlayerId::new(1), 2);
        assert_eq!(state.players[p0].life, 22);
    }
}
