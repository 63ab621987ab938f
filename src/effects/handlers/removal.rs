use super::creature_ids;
use crate::cards::CardType;
use crate::core::{EntityId, GameState, Result};
use crate::effects::{EffectContext, Flow, Target};
use crate::interaction::{ChoicePurpose, PendingInput};
use crate::rules::Destruction;
use crate::zones::{Zone, ZonePosition};

pub(crate) fn destroy_target(state: &mut GameState, ctx: &EffectContext, no_regeneration: bool) -> Result<()> {
    if let Some(id) = ctx.target_permanent() {
        Destruction::destroy(state, id, no_regeneration)?;
    }
    Ok(())
}

/// Destroy each listed permanent still on the battlefield.
fn destroy_each(state: &mut GameState, ids: Vec<EntityId>, no_regeneration: bool) -> Result<()> {
    for id in ids {
        if state.permanent(id).is_some() {
            Destruction::destroy(state, id, no_regeneration)?;
        }
    }
    Ok(())
}

pub(crate) fn destroy_all_creatures(state: &mut GameState, no_regeneration: bool) -> Result<()> {
    let ids = creature_ids(state, |_| true);
    destroy_each(state, ids, no_regeneration)
}

pub(crate) fn destroy_all_enchantments(state: &mut GameState) -> Result<()> {
    let ids = state
        .all_permanents()
        .filter(|p| p.definition().has_type(CardType::Enchantment))
        .map(|p| p.id)
        .collect();
    destroy_each(state, ids, false)
}

pub(crate) fn move_target(state: &mut GameState, ctx: &EffectContext, zone: Zone, position: ZonePosition) -> Result<()> {
    match ctx.target_permanent() {
        Some(id) => state.move_permanent(id, zone, position),
        None => Ok(()),
    }
}

pub(crate) fn bounce_all_creatures(state: &mut GameState) -> Result<()> {
    for id in creature_ids(state, |_| true) {
        state.move_permanent(id, Zone::Hand, ZonePosition::Top)?;
    }
    Ok(())
}

pub(crate) fn return_self(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    match ctx.source.filter(|id| state.permanent(*id).is_some()) {
        Some(id) => state.move_permanent(id, Zone::Hand, ZonePosition::Top),
        None => Ok(()),
    }
}

pub(crate) fn sacrifice_self(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    match ctx.source.filter(|id| state.permanent(*id).is_some()) {
        Some(id) => state.sacrifice(id),
        None => Ok(()),
    }
}

/// The target player picks a creature of theirs; with one choice there is
/// nothing to ask.
pub(crate) fn target_player_sacrifices(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    let Some(player) = ctx.target_player() else {
        return Ok(Flow::Continue);
    };
    let options = creature_ids(state, |p| p.controller == player);
    match options.as_slice() {
        [] => {
            state.log_event(format!("{player} has no creatures to sacrifice."));
            Ok(Flow::Continue)
        }
        [only] => {
            state.sacrifice(*only)?;
            Ok(Flow::Continue)
        }
        _ => {
            state.pending = Some(PendingInput::PermanentChoice {
                player,
                purpose: ChoicePurpose::SacrificeCreature,
                options: options.into_iter().map(Target::Permanent).collect(),
                optional: false,
            });
            Ok(Flow::Suspend)
        }
    }
}

pub(crate) fn sacrifice_at_end_of_combat(state: &mut GameState, ctx: &EffectContext) {
    let Some(perm) = ctx.target_permanent().and_then(|id| state.permanent(id)) else {
        return;
    };
    let (id, name) = (perm.id, perm.name().to_string());
    state.end_of_combat_sacrifices.push(id);
    state.log_event(format!("{name} will be sacrificed at end of combat."));
}

/// Destroy every creature blocking or blocked by the source, then the
/// source.
pub(crate) fn destroy_combatants_and_self(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    let Some(source) = ctx.source else {
        return Ok(());
    };
    let mut ids: Vec<EntityId> = state.combat.blocked_by(source).to_vec();
    ids.extend(state.combat.blockers_of(source));
    ids.push(source);
    destroy_each(state, ids, false)
}
