//! Static Query Engine.
//!
//! Effective characteristics of a permanent are computed fresh on every
//! query by scanning every permanent on both battlefields for
//! `StaticEffect`s. There is no cached "current power" anywhere; combat,
//! targeting and state-based actions all ask here.
//!
//! ## Layer order
//!
//! 1. Characteristic-defining power/toughness of the permanent itself
//! 2. Type-changing animation (self animation, animate-artifacts)
//! 3. Base power/toughness setters; the highest source entity id wins
//! 4. Additive: static boosts, temporary modifiers, +1/+1 counters
//! 5. Keyword grants (set union)
//!
//! ```
//! use duel_engine::cards::{Card, CardDefinition, Subtype};
//! use duel_engine::core::{EngineConfig, GameState, PlayerId};
//! use duel_engine::effects::StaticEffect;
//! use duel_engine::statics::StaticQuery;
//! use std::sync::Arc;
//!
//! let mut state = GameState::new(EngineConfig::default());
//! let p0 = PlayerId::new(0);
//!
//! let lord = CardDefinition::creature("Goblin King", "{1}{R}{R}".parse().unwrap(), 2, 2)
//!     .with_subtype(Subtype::Goblin)
//!     .with_static(StaticEffect::lord(Subtype::Goblin, 1, 1));
//! let grunt = CardDefinition::creature("Goblin Piker", "{1}{R}".parse().unwrap(), 2, 1)
//!     .with_subtype(Subtype::Goblin);
//!
//! let lord_card = Card::new(state.alloc_id(), p0, Arc::new(lord));
//! let grunt_card = Card::new(state.alloc_id(), p0, Arc::new(grunt));
//! let king = state.put_onto_battlefield(lord_card, p0);
//! let piker = state.put_onto_battlefield(grunt_card, p0);
//!
//! let piker = state.permanent(piker).unwrap();
//! assert_eq!(StaticQuery::power(&state, piker), 3);
//! // "Other" goblins: the king does not boost itself.
//! assert_eq!(StaticQuery::power(&state, state.permanent(king).unwrap()), 2);
//! ```

use smallvec::SmallVec;

use crate::cards::{CardType, Color, ColorSet, Keyword, KeywordSet, Permanent, Subtype};
use crate::core::{GameState, PlayerId};
use crate::effects::{CountOf, GrantScope, StaticEffect};

/// The effective characteristics of one permanent at one moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Characteristics {
    pub is_creature: bool,
    pub power: i32,
    pub toughness: i32,
    pub keywords: KeywordSet,
    pub protection: ColorSet,
    pub color: Option<Color>,
}

/// Read-only queries over continuous effects.
pub struct StaticQuery;

impl StaticQuery {
    /// Compute everything at once.
    #[must_use]
    pub fn characteristics(state: &GameState, perm: &Permanent) -> Characteristics {
        let def = perm.definition();

        // Layer 1: characteristic-defining P/T.
        let cda = def.statics.iter().find_map(|s| match s {
            StaticEffect::PowerToughnessFromCount { count } => Some(Self::count(state, perm.controller, *count)),
            _ => None,
        });
        let mut power = cda.or(def.power).unwrap_or(0);
        let mut toughness = cda.or(def.toughness).unwrap_or(0);
        let mut is_creature = def.is_creature();

        // Layer 2: animation.
        if let Some((p, t)) = perm.animated {
            is_creature = true;
            power = p;
            toughness = t;
        } else if !is_creature
            && def.has_type(CardType::Artifact)
            && Self::any_static(state, |s| matches!(s, StaticEffect::AnimateNoncreatureArtifacts))
        {
            is_creature = true;
            let value = i32::try_from(def.mana_value()).unwrap_or(i32::MAX);
            power = value;
            toughness = value;
        }

        // Layer 3: base setters from attached auras, latest id wins.
        let base = state
            .all_permanents()
            .filter(|s| s.attached_to == Some(perm.id))
            .filter_map(|s| {
                s.definition().statics.iter().find_map(|e| match e {
                    StaticEffect::SetEnchantedCreatureBase { power, toughness } => {
                        Some((s.id, *power, *toughness))
                    }
                    _ => None,
                })
            })
            .max_by_key(|(id, _, _)| *id);
        if let Some((_, p, t)) = base {
            power = p;
            toughness = t;
        }

        // Layers 4 and 5.
        let mut keywords = def.keywords.union(perm.granted_keywords);
        if is_creature {
            for source in state.all_permanents() {
                for effect in &source.definition().statics {
                    let (dp, dt, kw) = Self::contribution(source, perm, effect);
                    power += dp;
                    toughness += dt;
                    keywords = keywords.union(kw);
                }
            }
            power += perm.power_modifier + perm.plus_counters;
            toughness += perm.toughness_modifier + perm.plus_counters;
        }

        let mut protection = ColorSet::empty();
        for effect in &def.statics {
            match effect {
                StaticEffect::ProtectionFromColors { colors } => protection = protection.union(*colors),
                StaticEffect::ProtectionFromChosenColor => {
                    if let Some(color) = perm.chosen_color {
                        protection.insert(color);
                    }
                }
                _ => {}
            }
        }

        Characteristics {
            is_creature,
            power,
            toughness,
            keywords,
            protection,
            color: def.color,
        }
    }

    /// What one static effect on `source` adds to `target`.
    fn contribution(
        source: &Permanent,
        target: &Permanent,
        effect: &StaticEffect,
    ) -> (i32, i32, KeywordSet) {
        let none = (0, 0, KeywordSet::empty());
        let other = source.id != target.id;
        let attached = target_is_attached(source, target);
        match effect {
            StaticEffect::BoostCreaturesBySubtype { subtype, power, toughness, keywords } => {
                if other && target.definition().has_subtype(*subtype) {
                    (*power, *toughness, *keywords)
                } else {
                    none
                }
            }
            StaticEffect::BoostOtherOwnCreatures { power, toughness } => {
                if other && source.controller == target.controller {
                    (*power, *toughness, KeywordSet::empty())
                } else {
                    none
                }
            }
            StaticEffect::BoostEnchantedCreature { power, toughness }
            | StaticEffect::BoostEquippedCreature { power, toughness } => {
                if attached {
                    (*power, *toughness, KeywordSet::empty())
                } else {
                    none
                }
            }
            StaticEffect::GrantKeyword { keyword, scope } => {
                let applies = match scope {
                    GrantScope::EnchantedCreature | GrantScope::EquippedCreature => attached,
                    GrantScope::OwnCreatures => source.controller == target.controller,
                    GrantScope::OwnTappedCreatures => source.controller == target.controller && target.tapped,
                };
                if applies {
                    (0, 0, KeywordSet::of(&[*keyword]))
                } else {
                    none
                }
            }
            StaticEffect::BoostOtherCreaturesByColor { color, power, toughness } => {
                if other && target.definition().color == Some(*color) {
                    (*power, *toughness, KeywordSet::empty())
                } else {
                    none
                }
            }
            StaticEffect::BoostNonColorCreatures { color, power, toughness } => {
                if target.definition().color != Some(*color) {
                    (*power, *toughness, KeywordSet::empty())
                } else {
                    none
                }
            }
            _ => none,
        }
    }

    fn count(state: &GameState, controller: PlayerId, count: CountOf) -> i32 {
        let n = match count {
            CountOf::CreatureCardsInAllGraveyards => state
                .players
                .values()
                .flat_map(|b| b.graveyard.iter())
                .filter(|c| c.definition.is_creature())
                .count(),
            CountOf::LandsYouControl(subtype) => state.players[controller]
                .battlefield
                .iter()
                .filter(|p| p.definition().is_land() && p.definition().has_subtype(subtype))
                .count(),
            CountOf::CardsInHand => state.players[controller].hand.len(),
            CountOf::CreaturesYouControl => state.players[controller]
                .battlefield
                .iter()
                .filter(|p| p.definition().is_creature())
                .count(),
        };
        i32::try_from(n).unwrap_or(i32::MAX)
    }

    fn any_static(state: &GameState, predicate: impl Fn(&StaticEffect) -> bool) -> bool {
        state
            .all_permanents()
            .any(|p| p.definition().statics.iter().any(&predicate))
    }

    // === Single characteristics ===

    #[must_use]
    pub fn power(state: &GameState, perm: &Permanent) -> i32 {
        Self::characteristics(state, perm).power
    }

    #[must_use]
    pub fn toughness(state: &GameState, perm: &Permanent) -> i32 {
        Self::characteristics(state, perm).toughness
    }

    #[must_use]
    pub fn keywords(state: &GameState, perm: &Permanent) -> KeywordSet {
        Self::characteristics(state, perm).keywords
    }

    #[must_use]
    pub fn has_keyword(state: &GameState, perm: &Permanent, keyword: Keyword) -> bool {
        Self::keywords(state, perm).contains(keyword)
    }

    #[must_use]
    pub fn is_creature(state: &GameState, perm: &Permanent) -> bool {
        Self::characteristics(state, perm).is_creature
    }

    #[must_use]
    pub fn protection(state: &GameState, perm: &Permanent) -> ColorSet {
        Self::characteristics(state, perm).protection
    }

    // === Restrictions ===

    /// A player has shroud while they control a permanent granting it.
    #[must_use]
    pub fn player_has_shroud(state: &GameState, player: PlayerId) -> bool {
        state.players[player]
            .battlefield
            .iter()
            .any(|p| p.definition().has_static(|s| matches!(s, StaticEffect::ControllerHasShroud)))
    }

    /// Multiplier applied to all damage: doubled once per doubling effect.
    #[must_use]
    pub fn damage_multiplier(state: &GameState) -> i32 {
        let doublers = state
            .all_permanents()
            .flat_map(|p| p.definition().statics.iter())
            .filter(|s| matches!(s, StaticEffect::DoubleDamage))
            .count();
        1_i32 << doublers.min(16)
    }

    fn attached_statics<'a>(state: &'a GameState, perm: &'a Permanent) -> impl Iterator<Item = &'a StaticEffect> {
        state
            .all_permanents()
            .filter(move |s| target_is_attached(s, perm))
            .flat_map(|s| s.definition().statics.iter())
    }

    /// Under a "doesn't untap during untap" effect.
    #[must_use]
    pub fn doesnt_untap(state: &GameState, perm: &Permanent) -> bool {
        Self::attached_statics(state, perm).any(|s| matches!(s, StaticEffect::EnchantedCreatureDoesntUntap))
    }

    #[must_use]
    pub fn cant_attack_or_block(state: &GameState, perm: &Permanent) -> bool {
        Self::attached_statics(state, perm).any(|s| matches!(s, StaticEffect::EnchantedCreatureCantAttackOrBlock))
    }

    #[must_use]
    pub fn cant_be_blocked(perm: &Permanent) -> bool {
        perm.cant_be_blocked_this_turn
            || perm.definition().has_static(|s| matches!(s, StaticEffect::CantBeBlocked))
    }

    #[must_use]
    pub fn can_only_block_flyers(perm: &Permanent) -> bool {
        perm.definition().has_static(|s| matches!(s, StaticEffect::CanOnlyBlockFlyers))
    }

    /// Subtypes that cannot block this attacker.
    #[must_use]
    pub fn unblockable_by(perm: &Permanent) -> SmallVec<[Subtype; 2]> {
        perm.definition()
            .statics
            .iter()
            .filter_map(|s| match s {
                StaticEffect::CantBeBlockedBySubtype { subtype } => Some(*subtype),
                _ => None,
            })
            .collect()
    }

    /// How many attackers this creature may block.
    #[must_use]
    pub fn block_limit(perm: &Permanent) -> u32 {
        1 + perm
            .definition()
            .statics
            .iter()
            .map(|s| match s {
                StaticEffect::CanBlockAdditionalCreatures { count } => *count,
                _ => 0,
            })
            .sum::<u32>()
    }

    #[must_use]
    pub fn must_attack(perm: &Permanent) -> bool {
        perm.definition().has_static(|s| matches!(s, StaticEffect::MustAttack))
    }

    /// Generic mana each creature attacking `defender` costs.
    #[must_use]
    pub fn attack_tax(state: &GameState, defender: PlayerId) -> u32 {
        state.players[defender]
            .battlefield
            .iter()
            .flat_map(|p| p.definition().statics.iter())
            .map(|s| match s {
                StaticEffect::AttackTax { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// The tightest spells-per-turn limit in play (applies to each player).
    #[must_use]
    pub fn spell_limit(state: &GameState) -> Option<u32> {
        state
            .all_permanents()
            .flat_map(|p| p.definition().statics.iter())
            .filter_map(|s| match s {
                StaticEffect::LimitSpellsPerTurn { max } => Some(*max),
                _ => None,
            })
            .min()
    }
}

/// `source` is attached to `target` and its effects reach it.
fn target_is_attached(source: &Permanent, target: &Permanent) -> bool {
    source.attached_to == Some(target.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition};
    use crate::core::{EngineConfig, EntityId, ManaCost};
    use std::sync::Arc;

    fn cost(text: &str) -> ManaCost {
        text.parse().unwrap()
    }

    fn put(state: &mut GameState, def: CardDefinition, controller: PlayerId) -> EntityId {
        let card = Card::new(state.alloc_id(), controller, Arc::new(def));
        state.put_onto_battlefield(card, controller)
    }

    fn chars(state: &GameState, id: EntityId) -> Characteristics {
        StaticQuery::characteristics(state, state.permanent(id).unwrap())
    }

    #[test]
    fn test_additive_boosts_stack() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let bears = put(&mut state, CardDefinition::creature("Bears", cost("{1}{G}"), 2, 2), p0);
        for name in ["Anthem A", "Anthem B"] {
            put(
                &mut state,
                CardDefinition::enchantment(name, cost("{W}"))
                    .with_static(StaticEffect::BoostOtherOwnCreatures { power: 1, toughness: 1 }),
                p0,
            );
        }
        state.permanent_mut(bears).unwrap().power_modifier = 3;
        state.permanent_mut(bears).unwrap().plus_counters = 1;

        let c = chars(&state, bears);
        assert_eq!((c.power, c.toughness), (2 + 2 + 3 + 1, 2 + 2 + 1));
    }

    #[test]
    fn test_opponent_anthem_does_not_apply() {
        let mut state = GameState::new(EngineConfig::default());
        let bears = put(&mut state, CardDefinition::creature("Bears", cost("{1}{G}"), 2, 2), PlayerId::new(0));
        put(
            &mut state,
            CardDefinition::enchantment("Anthem", cost("{W}"))
                .with_static(StaticEffect::BoostOtherOwnCreatures { power: 1, toughness: 1 }),
            PlayerId::new(1),
        );
        assert_eq!(chars(&state, bears).power, 2);
    }

    #[test]
    fn test_base_setter_then_additive() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let giant = put(&mut state, CardDefinition::creature("Giant", cost("{3}{R}"), 3, 3), p0);
        let shrink = put(
            &mut state,
            CardDefinition::aura("Shrink", cost("{U}"))
                .with_static(StaticEffect::SetEnchantedCreatureBase { power: 0, toughness: 2 }),
            p0,
        );
        let grow = put(
            &mut state,
            CardDefinition::aura("Grow", cost("{G}"))
                .with_static(StaticEffect::BoostEnchantedCreature { power: 2, toughness: 2 }),
            p0,
        );
        state.permanent_mut(shrink).unwrap().attached_to = Some(giant);
        state.permanent_mut(grow).unwrap().attached_to = Some(giant);

        let c = chars(&state, giant);
        assert_eq!((c.power, c.toughness), (2, 4));
    }

    #[test]
    fn test_animated_artifact_uses_mana_value() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let rock = put(&mut state, CardDefinition::artifact("Rock", cost("{3}")), p0);
        assert!(!chars(&state, rock).is_creature);

        put(
            &mut state,
            CardDefinition::enchantment("March", cost("{3}{U}"))
                .with_static(StaticEffect::AnimateNoncreatureArtifacts),
            PlayerId::new(1),
        );
        let c = chars(&state, rock);
        assert!(c.is_creature);
        assert_eq!((c.power, c.toughness), (3, 3));
    }

    #[test]
    fn test_characteristic_defining_count() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let avatar = put(
            &mut state,
            CardDefinition::creature("Avatar", cost("{2}{G}"), 0, 0)
                .with_static(StaticEffect::PowerToughnessFromCount { count: CountOf::CreaturesYouControl }),
            p0,
        );
        put(&mut state, CardDefinition::creature("Bears", cost("{1}{G}"), 2, 2), p0);
        let c = chars(&state, avatar);
        assert_eq!((c.power, c.toughness), (2, 2));
    }

    #[test]
    fn test_keyword_grants_union() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let bird = put(
            &mut state,
            CardDefinition::creature("Bird", cost("{W}"), 1, 1).with_keyword(Keyword::Flying),
            p0,
        );
        put(
            &mut state,
            CardDefinition::enchantment("Aura of Haste", cost("{R}")).with_static(StaticEffect::GrantKeyword {
                keyword: Keyword::Haste,
                scope: GrantScope::OwnCreatures,
            }),
            p0,
        );
        let kw = chars(&state, bird).keywords;
        assert!(kw.contains(Keyword::Flying));
        assert!(kw.contains(Keyword::Haste));
    }

    #[test]
    fn test_damage_multiplier_and_spell_limit() {
        let mut state = GameState::new(EngineConfig::default());
        assert_eq!(StaticQuery::damage_multiplier(&state), 1);
        assert_eq!(StaticQuery::spell_limit(&state), None);
        put(
            &mut state,
            CardDefinition::enchantment("Furnace", cost("{1}{R}{R}{R}")).with_static(StaticEffect::DoubleDamage),
            PlayerId::new(0),
        );
        put(
            &mut state,
            CardDefinition::artifact("Arcane Lab", cost("{2}")).with_static(StaticEffect::LimitSpellsPerTurn { max: 1 }),
            PlayerId::new(1),
        );
        assert_eq!(StaticQuery::damage_multiplier(&state), 2);
        assert_eq!(StaticQuery::spell_limit(&state), Some(1));
    }
}
