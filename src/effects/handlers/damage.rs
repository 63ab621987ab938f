use super::creature_ids;
use crate::cards::Keyword;
use crate::core::{GameState, PlayerId, Result};
use crate::effects::EffectContext;
use crate::rules::Damage;
use crate::statics::StaticQuery;

pub(crate) fn to_target(state: &mut GameState, ctx: &EffectContext, amount: i32) -> Result<()> {
    let Some(target) = ctx.target() else {
        return Ok(());
    };
    let source = ctx.damage_source(state);
    Damage::to_target(state, &source, target, amount)?;
    Ok(())
}

/// The i-th amount goes to the i-th target.
pub(crate) fn ordered(state: &mut GameState, ctx: &EffectContext, amounts: &[i32]) -> Result<()> {
    let source = ctx.damage_source(state);
    for (target, amount) in ctx.targets.iter().zip(amounts) {
        if let Some(target) = target {
            Damage::to_target(state, &source, *target, *amount)?;
        }
    }
    Ok(())
}

pub(crate) fn to_creatures(state: &mut GameState, ctx: &EffectContext, amount: i32, flying_only: bool) -> Result<()> {
    let source = ctx.damage_source(state);
    let victims = creature_ids(state, |p| !flying_only || StaticQuery::has_keyword(state, p, Keyword::Flying));
    for id in victims {
        if state.permanent(id).is_some() {
            Damage::to_permanent(state, &source, id, amount)?;
        }
    }
    Ok(())
}

pub(crate) fn to_players(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    let source = ctx.damage_source(state);
    for player in PlayerId::starting_with(state.active_player) {
        Damage::to_player(state, &source, player, amount);
    }
}

pub(crate) fn to_controller(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    let source = ctx.damage_source(state);
    Damage::to_player(state, &source, ctx.controller, amount);
}
