//! Playing cards from hand.
//!
//! Lands are played directly onto the battlefield. Everything else is cast:
//! timing, the spell limit and targets are validated, the cost (plus X) is
//! paid from the mana pool, and the spell goes on the stack. Validation
//! happens before the card leaves the hand.

use tracing::debug;

use crate::cards::{Card, CardDefinition, EffectSlot};
use crate::core::{EngineError, GameState, PlayerId, Result, Step};
use crate::effects::{Effect, Target, TargetContext, TargetValidator};
use crate::stack::StackEntry;
use crate::statics::StaticQuery;

/// Land drops and spell casting.
pub struct Casting;

impl Casting {
    /// Play the card at `hand_index`: a land drop, or casting a spell with
    /// the chosen targets and X value.
    pub fn play_card(
        state: &mut GameState,
        player: PlayerId,
        hand_index: usize,
        targets: &[Target],
        x: u32,
    ) -> Result<()> {
        let card = state.players[player]
            .hand
            .get(hand_index)
            .cloned()
            .ok_or(EngineError::InvalidIndex { what: "hand", index: hand_index })?;

        if card.definition.is_land() {
            Self::check_land_drop(state, player)?;
            let card = Self::take_from_hand(state, player, hand_index)?;
            state.players[player].lands_played += 1;
            state.log_event(format!("{player} plays {}.", card.name()));
            state.put_onto_battlefield(card, player);
            state.priority.clear();
            return Ok(());
        }

        let def = card.definition.clone();
        Self::check_spell_timing(state, player, &def)?;

        let requirement = def.target_requirement();
        let ctx = TargetContext::new(player, def.color);
        match &requirement {
            Some(req) => TargetValidator::validate_choice(state, req, targets, &ctx)?,
            None if !targets.is_empty() => {
                return Err(EngineError::illegal_target(format!("{} has no targets", def.name)));
            }
            None => {}
        }

        let cost = def.mana_cost.clone().unwrap_or_default();
        if x > 0 && !cost.has_x() {
            return Err(EngineError::rejected(format!("{} has no X in its cost", def.name)));
        }
        let x_value = i32::try_from(x).map_err(|_| EngineError::rejected("X is too large"))?;
        cost.pay(&mut state.players[player].mana_pool, x)?;

        let card = Self::take_from_hand(state, player, hand_index)?;
        state.players[player].spells_cast += 1;
        state.log_event(format!("{player} casts {}.", card.name()));
        let id = state.alloc_id();
        let entry = StackEntry::spell(id, card, player)
            .with_targets(targets.iter().copied())
            .with_x(x_value)
            .with_requirement(requirement);
        debug!(entry = %entry.description, x, "spell pushed");
        state.stack.push(entry);
        state.priority.clear();
        Ok(())
    }

    /// Whether the card could be played right now, ignoring its cost.
    #[must_use]
    pub fn can_play_now(state: &GameState, player: PlayerId, card: &Card) -> bool {
        if card.definition.is_land() {
            Self::check_land_drop(state, player).is_ok()
        } else {
            Self::check_spell_timing(state, player, &card.definition).is_ok()
        }
    }

    /// Hand indices the player could play now with the mana they can make.
    /// Targets are not checked.
    #[must_use]
    pub fn playable_indices(state: &GameState, player: PlayerId) -> Vec<usize> {
        let available = Self::potential_mana(state, player);
        state.players[player]
            .hand
            .iter()
            .enumerate()
            .filter(|(_, card)| Self::can_play_now(state, player, card))
            .filter(|(_, card)| card.definition.is_land() || card.definition.mana_value() <= available)
            .map(|(i, _)| i)
            .collect()
    }

    /// Mana in the pool plus what untapped sources could still add.
    #[must_use]
    pub fn potential_mana(state: &GameState, player: PlayerId) -> u32 {
        let board = &state.players[player];
        let from_sources: u32 = board
            .battlefield
            .iter()
            .filter(|p| !p.tapped)
            .map(|p| {
                let def = p.definition();
                let on_tap = mana_amount(def.effects_for(EffectSlot::OnTap));
                let sick = p.summoning_sick && StaticQuery::is_creature(state, p);
                let abilities: u32 = def
                    .abilities
                    .iter()
                    .filter(|a| a.is_mana_ability() && a.mana_cost.is_none() && !(a.requires_tap && sick))
                    .map(|a| mana_amount(&a.effects))
                    .max()
                    .unwrap_or(0);
                if sick { abilities } else { on_tap.max(abilities) }
            })
            .sum();
        board.mana_pool.total() + from_sources
    }

    // === Timing ===

    fn check_land_drop(state: &GameState, player: PlayerId) -> Result<()> {
        Self::check_sorcery_timing(state, player)?;
        if state.players[player].lands_played > 0 {
            return Err(EngineError::rejected("you already played a land this turn"));
        }
        Ok(())
    }

    fn check_spell_timing(state: &GameState, player: PlayerId, def: &CardDefinition) -> Result<()> {
        if !def.has_flash_timing() {
            Self::check_sorcery_timing(state, player)?;
        }
        if let Some(limit) = StaticQuery::spell_limit(state) {
            if state.players[player].spells_cast >= limit {
                return Err(EngineError::rejected(format!(
                    "no more than {limit} spell(s) can be cast each turn"
                )));
            }
        }
        Ok(())
    }

    /// Your own main phase with an empty stack.
    pub(crate) fn check_sorcery_timing(state: &GameState, player: PlayerId) -> Result<()> {
        let wrong = |reason: &str| EngineError::WrongTiming { step: state.step, reason: reason.to_string() };
        if state.active_player != player {
            return Err(wrong("only during your own turn"));
        }
        if !state.step.is_main() {
            return Err(wrong("only during a main phase"));
        }
        if !state.stack.is_empty() {
            return Err(wrong("only while the stack is empty"));
        }
        Ok(())
    }

    /// Only during its controller's upkeep.
    pub(crate) fn check_upkeep_timing(state: &GameState, player: PlayerId) -> Result<()> {
        if state.active_player != player || state.step != Step::Upkeep {
            return Err(EngineError::WrongTiming {
                step: state.step,
                reason: "only during your upkeep".to_string(),
            });
        }
        Ok(())
    }

    fn take_from_hand(state: &mut GameState, player: PlayerId, index: usize) -> Result<Card> {
        state.players[player]
            .hand
            .remove(index)
            .ok_or_else(|| EngineError::invariant(format!("hand index {index} vanished")))
    }
}

fn mana_amount(effects: &[Effect]) -> u32 {
    effects
        .iter()
        .map(|e| match e {
            Effect::AddMana { amount, .. } => *amount,
            _ => 0,
        })
        .sum()
}
