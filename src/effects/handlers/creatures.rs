//! Temporary changes to permanents. Everything here except counters, copies
//! and equipment ends at cleanup.

use super::creature_ids;
use crate::cards::Keyword;
use crate::core::{EntityId, GameState};
use crate::effects::EffectContext;

fn boost(state: &mut GameState, id: Option<EntityId>, power: i32, toughness: i32) {
    let Some(perm) = id.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.power_modifier += power;
    perm.toughness_modifier += toughness;
    let name = perm.name().to_string();
    state.log_event(format!("{name} gets {power:+}/{toughness:+} until end of turn."));
}

pub(crate) fn boost_self(state: &mut GameState, ctx: &EffectContext, power: i32, toughness: i32) {
    boost(state, ctx.source, power, toughness);
}

pub(crate) fn boost_target(state: &mut GameState, ctx: &EffectContext, power: i32, toughness: i32) {
    boost(state, ctx.target_permanent(), power, toughness);
}

pub(crate) fn boost_own(state: &mut GameState, ctx: &EffectContext, power: i32, toughness: i32) {
    for id in creature_ids(state, |p| p.controller == ctx.controller) {
        boost(state, Some(id), power, toughness);
    }
}

pub(crate) fn grant_keyword(state: &mut GameState, id: Option<EntityId>, keyword: Keyword) {
    let Some(perm) = id.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.granted_keywords.insert(keyword);
    let name = perm.name().to_string();
    state.log_event(format!("{name} gains {keyword:?} until end of turn."));
}

pub(crate) fn make_unblockable(state: &mut GameState, ctx: &EffectContext) {
    let Some(perm) = ctx.target_permanent().and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.cant_be_blocked_this_turn = true;
    let name = perm.name().to_string();
    state.log_event(format!("{name} can't be blocked this turn."));
}

pub(crate) fn cant_block(state: &mut GameState, ctx: &EffectContext) {
    let Some(perm) = ctx.target_permanent().and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.cant_block_this_turn = true;
    let name = perm.name().to_string();
    state.log_event(format!("{name} can't block this turn."));
}

pub(crate) fn set_tapped(state: &mut GameState, id: Option<EntityId>, tapped: bool) {
    let Some(perm) = id.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.tapped = tapped;
    let name = perm.name().to_string();
    state.log_event(format!("{name} is {}.", if tapped { "tapped" } else { "untapped" }));
}

pub(crate) fn add_counters(state: &mut GameState, ctx: &EffectContext, count: i32) {
    let Some(perm) = ctx.source.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.plus_counters += count;
    let name = perm.name().to_string();
    state.log_event(format!("{name} gets {count} +1/+1 counter(s)."));
}

pub(crate) fn animate_self(state: &mut GameState, ctx: &EffectContext, power: i32, toughness: i32) {
    let Some(perm) = ctx.source.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.animated = Some((power, toughness));
    let name = perm.name().to_string();
    state.log_event(format!("{name} becomes a {power}/{toughness} creature until end of turn."));
}

pub(crate) fn regeneration_shield(state: &mut GameState, id: Option<EntityId>) {
    let Some(perm) = id.and_then(|id| state.permanent_mut(id)) else {
        return;
    };
    perm.regeneration_shields += 1;
    let name = perm.name().to_string();
    state.log_event(format!("{name} will regenerate."));
}

/// Attach the source equipment. An equipment whose creature leaves play is
/// unattached by state-based actions.
pub(crate) fn equip(state: &mut GameState, ctx: &EffectContext) {
    let (Some(equipment), Some(creature)) = (ctx.source, ctx.target_permanent()) else {
        return;
    };
    let Some(creature_name) = state.permanent(creature).map(|p| p.name().to_string()) else {
        return;
    };
    let Some(perm) = state.permanent_mut(equipment) else {
        return;
    };
    perm.attached_to = Some(creature);
    let name = perm.name().to_string();
    state.log_event(format!("{name} is attached to {creature_name}."));
}

/// The source permanent shows the target's card from now on. The original
/// card is what leaves play.
pub(crate) fn become_copy(state: &mut GameState, ctx: &EffectContext) {
    let (Some(source), Some(target)) = (ctx.source, ctx.target_permanent()) else {
        return;
    };
    let Some((definition, target_name)) = state
        .permanent(target)
        .map(|p| (p.card.definition.clone(), p.name().to_string()))
    else {
        return;
    };
    let Some(perm) = state.permanent_mut(source) else {
        return;
    };
    let old_name = perm.name().to_string();
    if perm.original_card.is_none() {
        perm.original_card = Some(perm.card.clone());
    }
    perm.card = perm.card.with_definition(definition);
    state.log_event(format!("{old_name} becomes a copy of {target_name}."));
}
