//! Resolving the top of the stack.

use tracing::debug;

use super::entry::StackEntry;
use crate::cards::Card;
use crate::core::{ControlChange, ControlDuration, EngineError, GameState, Result};
use crate::effects::{EffectContext, EffectResolver, StaticEffect, TargetValidator};
use crate::zones::{Zone, ZonePosition};

/// Resolves stack entries.
pub struct StackResolver;

impl StackResolver {
    /// Pop and resolve the top entry. Passes are cleared first, so priority
    /// goes back to the active player.
    pub fn resolve_top(state: &mut GameState) -> Result<()> {
        let entry = state
            .stack
            .pop()
            .ok_or_else(|| EngineError::invariant("nothing on the stack to resolve"))?;
        state.priority.clear();
        debug!(entry = %entry.description, kind = ?entry.kind, "resolving stack entry");

        if entry.kind.is_permanent_spell() {
            return Self::resolve_permanent(state, entry);
        }
        if TargetValidator::fizzles(state, &entry) {
            state.log_event(format!("{} fizzles (illegal target).", entry.description));
            return Self::discard_spell(state, entry);
        }
        state.log_event(format!("{} resolves.", entry.description));
        let ctx = EffectContext::from_entry(state, &entry);
        EffectResolver::run(state, ctx, entry.effects)
    }

    fn resolve_permanent(state: &mut GameState, entry: StackEntry) -> Result<()> {
        let controller = entry.controller;
        let card = if entry.is_copy {
            Card::token(state.alloc_id(), controller, entry.card.definition.clone())
        } else {
            entry.card.clone()
        };

        if !card.definition.is_aura() {
            state.put_onto_battlefield(card, controller);
            return Ok(());
        }

        let host = entry
            .targets
            .first()
            .and_then(|t| t.as_permanent())
            .filter(|id| state.permanent(*id).is_some());
        let Some(host) = host else {
            state.log_event(format!("{} fizzles (illegal target).", entry.description));
            return Self::discard_spell(state, entry);
        };

        let steals = card
            .definition
            .has_static(|s| matches!(s, StaticEffect::ControlEnchantedCreature));
        let aura_name = card.name().to_string();
        let aura = state.put_onto_battlefield(card, controller);
        state.require_permanent_mut(aura)?.attached_to = Some(host);
        let host_perm = state.require_permanent(host)?;
        let (host_name, original) = (host_perm.name().to_string(), host_perm.controller);
        state.log_event(format!("{aura_name} enchants {host_name}."));

        if steals && original != controller {
            state.control_changes.insert(
                host,
                ControlChange {
                    original,
                    duration: ControlDuration::WhileAttached(aura),
                },
            );
            state.change_control(host, controller)?;
        }
        Ok(())
    }

    /// A spell that did not resolve goes to its owner's graveyard. Copies and
    /// abilities cease to exist.
    fn discard_spell(state: &mut GameState, entry: StackEntry) -> Result<()> {
        if entry.kind.is_spell() && !entry.is_copy {
            state.put_card(entry.card, Zone::Graveyard, ZonePosition::Top)?;
        }
        Ok(())
    }
}
