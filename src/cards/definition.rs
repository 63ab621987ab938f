//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card: its name,
//! types, cost, printed power/toughness, keywords, and the effects it
//! carries. Definitions are shared between every physical copy of a card
//! through an `Arc`.
//!
//! Play state (damage, tapped, counters) lives on `Permanent`.
//!
//! ## Effect slots
//!
//! One-shot effects are bucketed by the moment they happen: the `Spell`
//! slot resolves when the card is cast, `OnEnter` when it enters the
//! battlefield, `OnDeath` when it dies, and so on. Continuous effects live
//! in `statics` and activated abilities in `abilities`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::characteristics::{CardType, Color, Keyword, KeywordSet, Subtype, Supertype};
use crate::core::{ManaColor, ManaCost};
use crate::effects::{Effect, StaticEffect, TargetRequirement};

/// When a one-shot effect list happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSlot {
    /// Instant and sorcery text.
    Spell,
    OnEnter,
    OnAttack,
    OnBlock,
    OnDeath,
    /// At the beginning of its controller's upkeep.
    Upkeep,
    /// At the beginning of its controller's draw step.
    DrawStep,
    /// At the beginning of each end step.
    EndStep,
    /// When its controller taps it with the tap verb.
    OnTap,
    /// When its controller sacrifices it with the sacrifice verb.
    OnSacrifice,
    OnCombatDamageToPlayer,
}

/// Timing restriction on an activated ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityTiming {
    /// Any time its controller has priority.
    #[default]
    Instant,
    SorcerySpeed,
    OnlyDuringYourUpkeep,
}

/// An activated ability ("{cost}: effect").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub description: String,
    pub mana_cost: Option<ManaCost>,
    pub requires_tap: bool,
    pub sacrifice_self: bool,
    /// Loyalty change paid as the cost (planeswalkers).
    pub loyalty_cost: Option<i32>,
    pub effects: Vec<Effect>,
    pub targeting: Option<TargetRequirement>,
    pub timing: AbilityTiming,
}

impl ActivatedAbility {
    /// Create an ability with no cost and no effects.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            mana_cost: None,
            requires_tap: false,
            sacrifice_self: false,
            loyalty_cost: None,
            effects: Vec::new(),
            targeting: None,
            timing: AbilityTiming::Instant,
        }
    }

    /// "{T}: Add {color}."
    #[must_use]
    pub fn tap_for_mana(color: ManaColor) -> Self {
        Self::new(format!("{{T}}: Add {{{}}}.", color.code()))
            .with_tap()
            .with_effect(Effect::mana(color))
    }

    /// A planeswalker loyalty ability.
    #[must_use]
    pub fn loyalty(description: impl Into<String>, change: i32) -> Self {
        let mut ability = Self::new(description);
        ability.loyalty_cost = Some(change);
        ability.timing = AbilityTiming::SorcerySpeed;
        ability
    }

    #[must_use]
    pub fn with_mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.requires_tap = true;
        self
    }

    #[must_use]
    pub fn with_sacrifice(mut self) -> Self {
        self.sacrifice_self = true;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targeting = Some(requirement);
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: AbilityTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Mana abilities resolve immediately and never use the stack.
    #[must_use]
    pub fn is_mana_ability(&self) -> bool {
        self.loyalty_cost.is_none()
            && self.targeting.is_none()
            && !self.effects.is_empty()
            && self.effects.iter().all(Effect::is_mana)
    }

    /// Target requirement, explicit or implied by the effects.
    #[must_use]
    pub fn target_requirement(&self) -> Option<TargetRequirement> {
        self.targeting
            .clone()
            .or_else(|| TargetRequirement::implied_by(&self.effects))
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{CardDefinition, Keyword};
///
/// let knight = CardDefinition::creature("White Knight", "{W}{W}".parse().unwrap(), 2, 2)
///     .with_keyword(Keyword::FirstStrike);
///
/// assert!(knight.is_creature());
/// assert_eq!(knight.mana_value(), 2);
/// assert!(knight.keywords.contains(Keyword::FirstStrike));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: String,
    pub types: SmallVec<[CardType; 2]>,
    pub supertypes: SmallVec<[Supertype; 1]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub mana_cost: Option<ManaCost>,
    /// Inferred from the cost unless set: the first of its colors in WUBRG
    /// order.
    ///
    /// A card has at most one color. Fear, protection and color-based
    /// prevention compare against this single value, so they need to move
    /// to a `ColorSet` before multicolored cards can be modelled.
    pub color: Option<Color>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub loyalty: Option<i32>,
    pub keywords: KeywordSet,
    pub effects: FxHashMap<EffectSlot, Vec<Effect>>,
    pub statics: Vec<StaticEffect>,
    pub abilities: Vec<ActivatedAbility>,
    pub targeting: Option<TargetRequirement>,
}

impl CardDefinition {
    /// Create a definition with the given types and cost.
    #[must_use]
    pub fn new(name: impl Into<String>, types: &[CardType], mana_cost: Option<ManaCost>) -> Self {
        let color = mana_cost.as_ref().and_then(color_of_cost);
        Self {
            name: name.into(),
            types: SmallVec::from_slice(types),
            supertypes: SmallVec::new(),
            subtypes: SmallVec::new(),
            mana_cost,
            color,
            power: None,
            toughness: None,
            loyalty: None,
            keywords: KeywordSet::empty(),
            effects: FxHashMap::default(),
            statics: Vec::new(),
            abilities: Vec::new(),
            targeting: None,
        }
    }

    #[must_use]
    pub fn creature(name: impl Into<String>, cost: ManaCost, power: i32, toughness: i32) -> Self {
        let mut def = Self::new(name, &[CardType::Creature], Some(cost));
        def.power = Some(power);
        def.toughness = Some(toughness);
        def
    }

    #[must_use]
    pub fn instant(name: impl Into<String>, cost: ManaCost) -> Self {
        Self::new(name, &[CardType::Instant], Some(cost))
    }

    #[must_use]
    pub fn sorcery(name: impl Into<String>, cost: ManaCost) -> Self {
        Self::new(name, &[CardType::Sorcery], Some(cost))
    }

    #[must_use]
    pub fn enchantment(name: impl Into<String>, cost: ManaCost) -> Self {
        Self::new(name, &[CardType::Enchantment], Some(cost))
    }

    /// An aura that enchants a creature.
    #[must_use]
    pub fn aura(name: impl Into<String>, cost: ManaCost) -> Self {
        Self::enchantment(name, cost)
            .with_subtype(Subtype::Aura)
            .with_target(TargetRequirement::creature())
    }

    #[must_use]
    pub fn artifact(name: impl Into<String>, cost: ManaCost) -> Self {
        Self::new(name, &[CardType::Artifact], Some(cost))
    }

    #[must_use]
    pub fn planeswalker(name: impl Into<String>, cost: ManaCost, loyalty: i32) -> Self {
        let mut def = Self::new(name, &[CardType::Planeswalker], Some(cost));
        def.loyalty = Some(loyalty);
        def
    }

    /// A land with no cost.
    #[must_use]
    pub fn land(name: impl Into<String>) -> Self {
        Self::new(name, &[CardType::Land], None)
    }

    /// A basic land that taps for one mana of its type.
    #[must_use]
    pub fn basic_land(subtype: Subtype) -> Self {
        let (name, color) = match subtype {
            Subtype::Plains => ("Plains", ManaColor::White),
            Subtype::Island => ("Island", ManaColor::Blue),
            Subtype::Swamp => ("Swamp", ManaColor::Black),
            Subtype::Mountain => ("Mountain", ManaColor::Red),
            _ => ("Forest", ManaColor::Green),
        };
        let mut def = Self::land(name).with_effect(EffectSlot::OnTap, Effect::mana(color));
        def.supertypes.push(Supertype::Basic);
        def.subtypes.push(if subtype.is_land_type() { subtype } else { Subtype::Forest });
        def
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.types.contains(&card_type) {
            self.types.push(card_type);
        }
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtypes.push(subtype);
        self
    }

    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.supertypes.push(Supertype::Legendary);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    /// Append an effect to a slot.
    #[must_use]
    pub fn with_effect(mut self, slot: EffectSlot, effect: Effect) -> Self {
        self.effects.entry(slot).or_default().push(effect);
        self
    }

    #[must_use]
    pub fn with_static(mut self, effect: StaticEffect) -> Self {
        self.statics.push(effect);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: ActivatedAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targeting = Some(requirement);
        self
    }

    // === Queries ===

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: Subtype) -> bool {
        self.subtypes.contains(&subtype)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.types.iter().any(|t| t.is_permanent())
    }

    /// Instants and anything with flash can be cast at instant speed.
    #[must_use]
    pub fn has_flash_timing(&self) -> bool {
        self.has_type(CardType::Instant) || self.keywords.contains(Keyword::Flash)
    }

    #[must_use]
    pub fn is_legendary(&self) -> bool {
        self.supertypes.contains(&Supertype::Legendary)
    }

    #[must_use]
    pub fn is_basic_land(&self) -> bool {
        self.is_land() && self.supertypes.contains(&Supertype::Basic)
    }

    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.has_subtype(Subtype::Aura)
    }

    #[must_use]
    pub fn is_equipment(&self) -> bool {
        self.has_subtype(Subtype::Equipment)
    }

    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.mana_cost.as_ref().map_or(0, ManaCost::mana_value)
    }

    /// Effects in a slot (empty if none).
    #[must_use]
    pub fn effects_for(&self, slot: EffectSlot) -> &[Effect] {
        self.effects.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Target requirement for casting, explicit or implied by spell effects.
    #[must_use]
    pub fn target_requirement(&self) -> Option<TargetRequirement> {
        self.targeting
            .clone()
            .or_else(|| TargetRequirement::implied_by(self.effects_for(EffectSlot::Spell)))
    }

    #[must_use]
    pub fn has_static(&self, predicate: impl Fn(&StaticEffect) -> bool) -> bool {
        self.statics.iter().any(predicate)
    }
}

fn color_of_cost(cost: &ManaCost) -> Option<Color> {
    Color::ALL
        .into_iter()
        .find(|c| cost.colored(c.mana()) > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::TargetKind;

    fn cost(text: &str) -> ManaCost {
        text.parse().unwrap()
    }

    #[test]
    fn test_color_inferred_from_cost() {
        let bolt = CardDefinition::instant("Lightning Bolt", cost("{R}"));
        assert_eq!(bolt.color, Some(Color::Red));

        let golem = CardDefinition::artifact("Ornithopter", cost("{0}"));
        assert_eq!(golem.color, None);
    }

    /// Test that a cost with two colors still yields a single color.
    #[test]
    fn test_two_color_cost_keeps_one_color() {
        let charm = CardDefinition::instant("Boros Charm", cost("{R}{W}"));
        assert_eq!(charm.color, Some(Color::White));
    }

    #[test]
    fn test_basic_land_taps_for_mana() {
        let forest = CardDefinition::basic_land(Subtype::Forest);
        assert!(forest.is_basic_land());
        assert_eq!(
            forest.effects_for(EffectSlot::OnTap),
            &[Effect::mana(ManaColor::Green)]
        );
        assert!(forest.effects_for(EffectSlot::Spell).is_empty());
    }

    #[test]
    fn test_implied_spell_target() {
        let bolt = CardDefinition::instant("Lightning Bolt", cost("{R}"))
            .with_effect(EffectSlot::Spell, Effect::damage(3));
        let req = bolt.target_requirement().unwrap();
        assert_eq!(req.kind, TargetKind::AnyTarget);

        let wrath = CardDefinition::sorcery("Wrath of God", cost("{2}{W}{W}"))
            .with_effect(EffectSlot::Spell, Effect::DestroyAllCreatures { no_regeneration: true });
        assert!(wrath.target_requirement().is_none());
    }

    #[test]
    fn test_aura_targets_creature() {
        let aura = CardDefinition::aura("Holy Strength", cost("{W}"));
        assert!(aura.is_aura());
        assert!(aura.is_permanent());
        assert_eq!(aura.target_requirement().unwrap().kind, TargetKind::Creature);
    }

    #[test]
    fn test_mana_ability_classification() {
        assert!(ActivatedAbility::tap_for_mana(ManaColor::Green).is_mana_ability());

        let shock = ActivatedAbility::new("{T}: 1 damage")
            .with_tap()
            .with_effect(Effect::damage(1));
        assert!(!shock.is_mana_ability());
        assert!(shock.target_requirement().is_some());
    }

    #[test]
    fn test_definition_serialization() {
        let card = CardDefinition::creature("Grizzly Bears", cost("{1}{G}"), 2, 2)
            .with_effect(EffectSlot::OnDeath, Effect::draw(1));

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
