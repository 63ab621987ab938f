//! State-based actions.
//!
//! Checked to a fixpoint after every change, before anyone gets a decision:
//!
//! 1. a player at 0 or less life, who drew from an empty library, or who
//!    lost through an effect loses (both at once is a draw);
//! 2. creatures with 0 or less toughness go to the graveyard;
//! 3. creatures with lethal damage are destroyed (regeneration applies);
//! 4. planeswalkers with no loyalty go to the graveyard;
//! 5. auras attached to nothing go to the graveyard;
//! 6. equipment attached to something that is not a creature in play falls off;
//! 7. control granted by an aura ends when the aura is no longer attached.
//!
//! The legend rule is not checked here. It is a prompt, raised by
//! [`settle`](super::settle) once fired triggers have been dealt with.

use tracing::debug;

use super::destruction::Destruction;
use crate::cards::{CardType, Keyword};
use crate::core::{ControlDuration, EntityId, GameState, PlayerId, Result};
use crate::statics::StaticQuery;

/// State-based action checks.
pub struct StateBasedActions;

impl StateBasedActions {
    /// Apply state-based actions until nothing changes.
    pub fn check(state: &mut GameState) -> Result<()> {
        let mut passes = 0;
        while state.is_running() && Self::apply_once(state)? {
            passes += 1;
        }
        debug!(passes, "state-based actions settled");
        Ok(())
    }

    /// One sweep. Returns true if anything changed.
    fn apply_once(state: &mut GameState) -> Result<bool> {
        if Self::check_losers(state) {
            return Ok(true);
        }
        let mut changed = false;

        for id in Self::zero_toughness(state) {
            let name = state.require_permanent(id)?.name().to_string();
            state.log_event(format!("{name} has 0 toughness."));
            state.dies(id)?;
            changed = true;
        }

        for id in Self::lethally_damaged(state) {
            if state.permanent(id).is_some() {
                Destruction::destroy(state, id, false)?;
                changed = true;
            }
        }

        let no_loyalty: Vec<EntityId> = state
            .all_permanents()
            .filter(|p| p.definition().has_type(CardType::Planeswalker) && p.loyalty <= 0)
            .map(|p| p.id)
            .collect();
        for id in no_loyalty {
            state.dies(id)?;
            changed = true;
        }

        let orphans: Vec<EntityId> = state
            .all_permanents()
            .filter(|p| p.definition().is_aura())
            .filter(|p| p.attached_to.and_then(|host| state.permanent(host)).is_none())
            .map(|p| p.id)
            .collect();
        for id in orphans {
            state.dies(id)?;
            changed = true;
        }

        let loose: Vec<EntityId> = state
            .all_permanents()
            .filter(|p| p.definition().is_equipment())
            .filter(|p| {
                p.attached_to.is_some_and(|host| {
                    state.permanent(host).map_or(true, |h| !StaticQuery::is_creature(state, h))
                })
            })
            .map(|p| p.id)
            .collect();
        for id in loose {
            state.require_permanent_mut(id)?.attached_to = None;
            changed = true;
        }

        changed |= Self::end_aura_control(state)?;
        Ok(changed)
    }

    fn check_losers(state: &mut GameState) -> bool {
        let losers: Vec<PlayerId> = state
            .players
            .iter()
            .filter(|(_, board)| board.life <= 0 || board.drew_from_empty || board.lost)
            .map(|(player, _)| player)
            .collect();
        match losers.as_slice() {
            [] => false,
            [loser] => {
                state.log_event(format!("{loser} loses the game."));
                state.finish(Some(loser.opponent()));
                true
            }
            _ => {
                state.finish(None);
                true
            }
        }
    }

    fn zero_toughness(state: &GameState) -> Vec<EntityId> {
        state
            .all_permanents()
            .filter(|p| {
                let chars = StaticQuery::characteristics(state, p);
                chars.is_creature && chars.toughness <= 0
            })
            .map(|p| p.id)
            .collect()
    }

    /// Indestructible creatures are left alone so the sweep can settle.
    fn lethally_damaged(state: &GameState) -> Vec<EntityId> {
        state
            .all_permanents()
            .filter(|p| {
                let chars = StaticQuery::characteristics(state, p);
                chars.is_creature
                    && p.damage > 0
                    && p.damage >= chars.toughness
                    && !chars.keywords.contains(Keyword::Indestructible)
            })
            .map(|p| p.id)
            .collect()
    }

    /// Give back permanents whose controlling aura left or moved.
    fn end_aura_control(state: &mut GameState) -> Result<bool> {
        let ended: Vec<(EntityId, PlayerId)> = state
            .control_changes
            .iter()
            .filter_map(|(id, change)| match change.duration {
                ControlDuration::WhileAttached(aura) => {
                    let attached = state.permanent(aura).and_then(|a| a.attached_to) == Some(*id);
                    (!attached).then_some((*id, change.original))
                }
                ControlDuration::EndOfTurn => None,
            })
            .collect();
        for (id, original) in &ended {
            state.control_changes.remove(id);
            if state.permanent(*id).is_some() {
                state.change_control(*id, *original)?;
            }
        }
        Ok(!ended.is_empty())
    }
}
