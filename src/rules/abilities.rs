//! Activated abilities and the tap and sacrifice verbs.
//!
//! Costs are checked in full before any is paid. Mana abilities resolve on
//! the spot and never use the stack; everything else is pushed as an
//! activated ability and waits for both players to pass.

use tracing::debug;

use super::casting::Casting;
use crate::cards::{AbilityTiming, ActivatedAbility, Card, EffectSlot, Keyword, Permanent};
use crate::core::{EngineError, EntityId, GameState, Intent, PlayerId, Result};
use crate::effects::{Effect, EffectContext, EffectResolver, Target, TargetContext, TargetRequirement, TargetValidator};
use crate::stack::{StackEntry, StackEntryKind};
use crate::statics::StaticQuery;

/// Activation of permanents' abilities.
pub struct Abilities;

impl Abilities {
    /// Activate ability `ability_index` of the permanent at
    /// `battlefield_index`.
    pub fn activate(
        state: &mut GameState,
        player: PlayerId,
        battlefield_index: usize,
        ability_index: usize,
        targets: &[Target],
        x: u32,
    ) -> Result<()> {
        let perm = state.permanent_at(player, battlefield_index)?;
        let ability = perm
            .definition()
            .abilities
            .get(ability_index)
            .cloned()
            .ok_or(EngineError::InvalidIndex { what: "ability", index: ability_index })?;
        let (id, card, name) = (perm.id, perm.card.clone(), perm.name().to_string());

        if ability.requires_tap {
            Self::check_can_tap(state, perm)?;
        }
        if let Some(change) = ability.loyalty_cost {
            if perm.loyalty_used {
                return Err(EngineError::rejected(format!(
                    "{name} already used a loyalty ability this turn"
                )));
            }
            if perm.loyalty + change < 0 {
                return Err(EngineError::rejected(format!("{name} doesn't have enough loyalty")));
            }
        }
        match ability.timing {
            AbilityTiming::Instant => {}
            AbilityTiming::SorcerySpeed => Casting::check_sorcery_timing(state, player)?,
            AbilityTiming::OnlyDuringYourUpkeep => Casting::check_upkeep_timing(state, player)?,
        }

        let requirement = ability.target_requirement();
        let ctx = TargetContext::new(player, card.definition.color).with_source(Some(id));
        Self::check_targets(state, requirement.as_ref(), targets, &ctx, &name)?;

        let cost = ability.mana_cost.clone().unwrap_or_default();
        if x > 0 && !cost.has_x() {
            return Err(EngineError::rejected(format!("{name}'s ability has no X in its cost")));
        }
        let x_value = i32::try_from(x).map_err(|_| EngineError::rejected("X is too large"))?;
        cost.pay(&mut state.players[player].mana_pool, x)?;

        // Costs beyond mana.
        let perm = state.require_permanent_mut(id)?;
        if ability.requires_tap {
            perm.tapped = true;
        }
        if let Some(change) = ability.loyalty_cost {
            perm.loyalty += change;
            perm.loyalty_used = true;
        }
        if ability.sacrifice_self {
            state.sacrifice(id)?;
        }

        if ability.is_mana_ability() {
            debug!(source = %name, "mana ability");
            let ctx = EffectContext::new(player, card, Some(id));
            return EffectResolver::run(state, ctx, ability.effects);
        }

        state.log_event(format!("{player} activates {name}."));
        let entry_id = state.alloc_id();
        let source = (!ability.sacrifice_self).then_some(id);
        let entry = StackEntry::ability(
            entry_id,
            StackEntryKind::ActivatedAbility,
            card,
            source,
            player,
            ability.effects,
        )
        .with_targets(targets.iter().copied())
        .with_x(x_value)
        .with_requirement(requirement);
        state.stack.push(entry);
        state.priority.clear();
        Ok(())
    }

    /// Tap a permanent for its on-tap effects.
    pub fn tap_permanent(state: &mut GameState, player: PlayerId, battlefield_index: usize) -> Result<()> {
        let perm = state.permanent_at(player, battlefield_index)?;
        let effects = perm.definition().effects_for(EffectSlot::OnTap).to_vec();
        if effects.is_empty() {
            return Err(EngineError::rejected(format!("{} has nothing to tap for", perm.name())));
        }
        if TargetRequirement::implied_by(&effects).is_some() {
            return Err(EngineError::rejected(format!(
                "{}'s tap ability needs a target; activate it instead",
                perm.name()
            )));
        }
        Self::check_can_tap(state, perm)?;
        let (id, card) = (perm.id, perm.card.clone());

        state.require_permanent_mut(id)?.tapped = true;
        if effects.iter().all(Effect::is_mana) {
            return EffectResolver::run(state, EffectContext::new(player, card, Some(id)), effects);
        }
        state.log_event(format!("{player} taps {}.", card.name()));
        Self::push(state, card, Some(id), player, effects);
        Ok(())
    }

    /// Sacrifice a permanent for its on-sacrifice ability.
    pub fn sacrifice_permanent(state: &mut GameState, player: PlayerId, battlefield_index: usize) -> Result<()> {
        let perm = state.permanent_at(player, battlefield_index)?;
        let effects = perm.definition().effects_for(EffectSlot::OnSacrifice).to_vec();
        if effects.is_empty() {
            return Err(EngineError::rejected(format!("{} has no sacrifice ability", perm.name())));
        }
        if TargetRequirement::implied_by(&effects).is_some() {
            return Err(EngineError::rejected(format!(
                "{}'s sacrifice ability needs a target",
                perm.name()
            )));
        }
        let (id, card) = (perm.id, perm.card.clone());
        state.sacrifice(id)?;
        Self::push(state, card, None, player, effects);
        Ok(())
    }

    /// Whether an intent only makes mana, which needs no priority.
    #[must_use]
    pub fn is_mana_action(state: &GameState, player: PlayerId, intent: &Intent) -> bool {
        match intent {
            Intent::ActivateAbility { battlefield_index, ability_index, .. } => state.players[player]
                .battlefield
                .get(*battlefield_index)
                .and_then(|p| p.definition().abilities.get(*ability_index))
                .is_some_and(ActivatedAbility::is_mana_ability),
            Intent::TapPermanent { permanent } => state.players[player]
                .battlefield
                .get(*permanent)
                .is_some_and(|p| {
                    let effects = p.definition().effects_for(EffectSlot::OnTap);
                    !effects.is_empty() && effects.iter().all(Effect::is_mana)
                }),
            _ => false,
        }
    }

    fn check_can_tap(state: &GameState, perm: &Permanent) -> Result<()> {
        if perm.tapped {
            return Err(EngineError::rejected(format!("{} is already tapped", perm.name())));
        }
        if perm.summoning_sick
            && StaticQuery::is_creature(state, perm)
            && !StaticQuery::has_keyword(state, perm, Keyword::Haste)
        {
            return Err(EngineError::rejected(format!("{} has summoning sickness", perm.name())));
        }
        Ok(())
    }

    fn check_targets(
        state: &GameState,
        requirement: Option<&TargetRequirement>,
        targets: &[Target],
        ctx: &TargetContext,
        name: &str,
    ) -> Result<()> {
        match requirement {
            Some(req) => TargetValidator::validate_choice(state, req, targets, ctx),
            None if targets.is_empty() => Ok(()),
            None => Err(EngineError::illegal_target(format!("{name}'s ability has no targets"))),
        }
    }

    fn push(
        state: &mut GameState,
        card: Card,
        source: Option<EntityId>,
        player: PlayerId,
        effects: Vec<Effect>,
    ) {
        let id = state.alloc_id();
        let entry = StackEntry::ability(id, StackEntryKind::ActivatedAbility, card, source, player, effects);
        state.log_event(format!("{} goes on the stack.", entry.description));
        state.stack.push(entry);
        state.priority.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{CardDefinition, Subtype};
    use crate::core::{EngineConfig, ManaColor, Step};

    fn put(state: &mut GameState, player: PlayerId, def: CardDefinition) -> EntityId {
        let card = Card::new(state.alloc_id(), player, Arc::new(def));
        state.put_onto_battlefield(card, player)
    }

    fn setup() -> (GameState, PlayerId, PlayerId) {
        let mut state = GameState::new(EngineConfig::default());
        state.step = Step::PrecombatMain;
        (state, PlayerId::new(0), PlayerId::new(1))
    }

    /// Test that tapping a land adds mana without using the stack.
    #[test]
    fn test_tap_land_for_mana() {
        let (mut state, p0, _) = setup();
        put(&mut state, p0, CardDefinition::basic_land(Subtype::Mountain));
        Abilities::tap_permanent(&mut state, p0, 0).unwrap();
        assert_eq!(state.players[p0].mana_pool.get(ManaColor::Red), 1);
        assert!(state.stack.is_empty());
        assert!(Abilities::tap_permanent(&mut state, p0, 0).is_err());
    }

    /// Test that a creature mana ability respects summoning sickness.
    #[test]
    fn test_summoning_sick_mana_creature() {
        let (mut state, p0, _) = setup();
        let elves = CardDefinition::creature("Llanowar Elves", "{G}".parse().unwrap(), 1, 1)
            .with_ability(ActivatedAbility::tap_for_mana(ManaColor::Green));
        let id = put(&mut state, p0, elves);
        assert!(Abilities::activate(&mut state, p0, 0, 0, &[], 0).is_err());

        state.permanent_mut(id).unwrap().summoning_sick = false;
        Abilities::activate(&mut state, p0, 0, 0, &[], 0).unwrap();
        assert_eq!(state.players[p0].mana_pool.get(ManaColor::Green), 1);
        assert!(state.stack.is_empty());
    }

    /// Test that a targeted ability goes on the stack with its target.
    #[test]
    fn test_targeted_ability_uses_stack() {
        let (mut state, p0, p1) = setup();
        let pinger = CardDefinition::creature("Prodigal Sorcerer", "{2}{U}".parse().unwrap(), 1, 1)
            .with_ability(ActivatedAbility::new("{T}: 1 damage to any target.").with_tap().with_effect(Effect::damage(1)));
        let id = put(&mut state, p0, pinger);
        state.permanent_mut(id).unwrap().summoning_sick = false;

        Abilities::activate(&mut state, p0, 0, 0, &[Target::Player(p1)], 0).unwrap();
        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.stack[0].kind, StackEntryKind::ActivatedAbility);
        assert!(state.permanent(id).unwrap().tapped);
    }

    /// Test loyalty costs: sorcery speed, once per turn, never below zero.
    #[test]
    fn test_loyalty_abilities() {
        let (mut state, p0, _) = setup();
        let walker = CardDefinition::planeswalker("Garruk", "{2}{G}{G}".parse().unwrap(), 3)
            .with_ability(ActivatedAbility::loyalty("+1: Draw a card.", 1).with_effect(Effect::draw(1)))
            .with_ability(ActivatedAbility::loyalty("-5: Draw five cards.", -5).with_effect(Effect::draw(5)));
        let id = put(&mut state, p0, walker);
        state.permanent_mut(id).unwrap().loyalty = 3;

        assert!(Abilities::activate(&mut state, p0, 0, 1, &[], 0).is_err());
        Abilities::activate(&mut state, p0, 0, 0, &[], 0).unwrap();
        assert_eq!(state.permanent(id).unwrap().loyalty, 4);
        assert!(Abilities::activate(&mut state, p0, 0, 0, &[], 0).is_err());
    }

    /// Test that sacrificing pushes the on-sacrifice ability with no source.
    #[test]
    fn test_sacrifice_verb() {
        let (mut state, p0, _) = setup();
        let egg = CardDefinition::artifact("Chromatic Sphere", "{1}".parse().unwrap())
            .with_effect(EffectSlot::OnSacrifice, Effect::draw(1));
        put(&mut state, p0, egg);
        Abilities::sacrifice_permanent(&mut state, p0, 0).unwrap();
        assert!(state.players[p0].battlefield.is_empty());
        assert_eq!(state.players[p0].graveyard.len(), 1);
        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.stack[0].source, None);
    }

    #[test]
    fn test_mana_actions_are_recognised() {
        let (mut state, p0, _) = setup();
        put(&mut state, p0, CardDefinition::basic_land(Subtype::Forest));
        assert!(Abilities::is_mana_action(&state, p0, &Intent::TapPermanent { permanent: 0 }));
        assert!(!Abilities::is_mana_action(&state, p0, &Intent::TapPermanent { permanent: 3 }));
        assert!(!Abilities::is_mana_action(&state, p0, &Intent::PassPriority));
    }
}
