//! Turn and step sequencing.
//!
//! The turn is a fixed cycle of [`Step`]s. Each step has an entry action
//! (draw, triggers, combat prompts, damage, cleanup) and then a priority
//! round; when both players pass with an empty stack the next step begins.
//!
//! ```text
//! Upkeep -> Draw -> Main 1 -> Attackers -> Blockers -> Damage
//!        -> End of Combat -> Main 2 -> End Step -> Cleanup -> (next turn)
//! ```
//!
//! Mana pools empty at every step boundary. Cleanup has no priority round:
//! once the hand is at its limit the turn rolls over.

use tracing::{debug, warn};

use super::casting::Casting;
use super::settle;
use crate::combat::Combat;
use crate::core::{ControlDuration, EngineError, EntityId, GameState, PlayerId, PreventionState, Result, Step};
use crate::interaction::{DiscardReason, PendingInput};
use crate::stack::StackResolver;
use crate::statics::StaticQuery;
use crate::triggers::{GameEvent, Triggers};

/// Steps, priority passes, and automatic passing.
pub struct TurnSequencer;

impl TurnSequencer {
    // === Priority ===

    /// `player` passes priority. Two passes in succession resolve the top
    /// of the stack, or end the step when the stack is empty.
    pub fn pass_priority(state: &mut GameState, player: PlayerId) -> Result<()> {
        if !state.is_running() {
            return Err(EngineError::NotRunning);
        }
        if state.pending.is_some() {
            return Err(EngineError::InputPending);
        }
        if state.priority_holder() != Some(player) {
            return Err(EngineError::NotYourPriority);
        }
        Self::record_pass(state, player)
    }

    fn record_pass(state: &mut GameState, player: PlayerId) -> Result<()> {
        state.priority.pass(player);
        if !state.priority.all_passed() {
            return Ok(());
        }
        if state.stack.is_empty() {
            Self::advance_step(state)
        } else {
            StackResolver::resolve_top(state)
        }
    }

    /// Pass for whoever holds priority until someone has a decision to make.
    ///
    /// A holder keeps priority when they have a playable card in hand or an
    /// auto-stop on the current step, whether or not the stack is empty. Two
    /// automatic passes over a non-empty stack resolve its top entry. The
    /// loop is capped by `EngineConfig::auto_pass_limit`.
    pub fn resolve_auto_pass(state: &mut GameState) -> Result<()> {
        let limit = state.config.auto_pass_limit;
        for _ in 0..limit {
            settle(state)?;
            if !state.is_running() || state.pending.is_some() {
                return Ok(());
            }
            let Some(holder) = state.priority_holder() else {
                Self::advance_step(state)?;
                continue;
            };
            if Self::wants_priority(state, holder) {
                return Ok(());
            }
            debug!(player = %holder, step = %state.step, "auto-passing");
            Self::record_pass(state, holder)?;
        }
        warn!(limit, turn = state.turn_number, step = %state.step, "auto-pass limit reached");
        Ok(())
    }

    fn wants_priority(state: &GameState, player: PlayerId) -> bool {
        state.players[player].auto_stops.contains(&state.step)
            || !Casting::playable_indices(state, player).is_empty()
    }

    // === Steps ===

    /// Leave the current step and enter the next one.
    pub fn advance_step(state: &mut GameState) -> Result<()> {
        if state.step == Step::EndOfCombat {
            for id in std::mem::take(&mut state.end_of_combat_sacrifices) {
                if state.permanent(id).is_some() {
                    state.sacrifice(id)?;
                }
            }
        }
        state.priority.clear();
        state.drain_mana_pools();

        let next = match state.step.next() {
            Some(Step::DeclareBlockers) if state.combat.attackers.is_empty() => Step::EndOfCombat,
            Some(step) => step,
            None => {
                Self::rollover(state)?;
                Step::FIRST
            }
        };
        state.step = next;
        debug!(step = %next, turn = state.turn_number, "entering step");
        Self::enter_step(state)
    }

    /// Run the entry action of the current step.
    pub fn enter_step(state: &mut GameState) -> Result<()> {
        let active = state.active_player;
        match state.step {
            Step::Upkeep => Triggers::fire(state, GameEvent::Upkeep(active)),
            Step::Draw => {
                if state.turn_number == 1 && active == state.starting_player {
                    state.log_event(format!("{active} skips the first draw."));
                } else {
                    state.draw_cards(active, 1);
                }
                Triggers::fire(state, GameEvent::DrawStep(active));
            }
            Step::PrecombatMain | Step::PostcombatMain => {}
            Step::DeclareAttackers => {
                if Combat::has_possible_attackers(state) {
                    state.pending = Some(PendingInput::DeclareAttackers { player: active });
                }
            }
            Step::DeclareBlockers => {
                if !state.combat.attackers.is_empty() && Combat::has_possible_blockers(state) {
                    state.pending = Some(PendingInput::DeclareBlockers {
                        player: state.defending_player(),
                    });
                }
            }
            Step::CombatDamage => Combat::resolve_damage(state)?,
            Step::EndOfCombat => Combat::clear(state),
            Step::EndStep => Triggers::fire(state, GameEvent::EndStep),
            Step::Cleanup => {
                let excess = state.players[active]
                    .hand
                    .len()
                    .saturating_sub(state.config.max_hand_size);
                if excess > 0 {
                    state.pending = Some(PendingInput::Discard {
                        player: active,
                        remaining: excess,
                        reason: DiscardReason::Cleanup,
                    });
                } else {
                    return Self::finish_cleanup(state);
                }
            }
        }
        Ok(())
    }

    /// End-of-turn resets once the hand is within its limit, then the next
    /// turn begins.
    pub fn finish_cleanup(state: &mut GameState) -> Result<()> {
        for (_, board) in state.players.iter_mut() {
            board.prevention_shield = 0;
            for perm in &mut board.battlefield {
                perm.reset_end_of_turn();
            }
        }
        state.prevention = PreventionState::default();
        Self::advance_step(state)
    }

    /// Hand the turn to the next player.
    fn rollover(state: &mut GameState) -> Result<()> {
        let next = state
            .extra_turns
            .pop_front()
            .unwrap_or_else(|| state.active_player.opponent());

        let expired: Vec<(EntityId, PlayerId)> = state
            .control_changes
            .iter()
            .filter(|(_, change)| change.duration == ControlDuration::EndOfTurn)
            .map(|(id, change)| (*id, change.original))
            .collect();
        for (id, original) in expired {
            state.control_changes.remove(&id);
            if state.permanent(id).is_some() {
                state.change_control(id, original)?;
            }
        }

        state.active_player = next;
        state.turn_number += 1;
        for (_, board) in state.players.iter_mut() {
            board.lands_played = 0;
            board.spells_cast = 0;
        }
        state.drain_mana_pools();

        let stays_tapped: Vec<EntityId> = state.players[next]
            .battlefield
            .iter()
            .filter(|p| StaticQuery::doesnt_untap(state, p))
            .map(|p| p.id)
            .collect();
        for perm in &mut state.players[next].battlefield {
            if !stays_tapped.contains(&perm.id) {
                perm.tapped = false;
            }
            perm.summoning_sick = false;
            perm.loyalty_used = false;
        }

        let turn = state.turn_number;
        state.log_event(format!("Turn {turn}: {next}'s turn."));
        Ok(())
    }
}
