use crate::core::GameState;
use crate::effects::EffectContext;
use crate::statics::StaticQuery;

pub(crate) fn target_loses(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    if let Some(player) = ctx.target_player() {
        state.lose_life(player, amount);
    }
}

pub(crate) fn drain(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    if let Some(player) = ctx.target_player() {
        state.lose_life(player, amount);
        state.gain_life(ctx.controller, amount);
    }
}

pub(crate) fn per_graveyard_card(state: &mut GameState, ctx: &EffectContext) {
    let count = state.players[ctx.controller].graveyard.len();
    state.gain_life(ctx.controller, i32::try_from(count).unwrap_or(i32::MAX));
}

/// The target's controller gains life equal to its toughness.
pub(crate) fn equal_to_target_toughness(state: &mut GameState, ctx: &EffectContext) {
    let Some(perm) = ctx.target_permanent().and_then(|id| state.permanent(id)) else {
        return;
    };
    let toughness = StaticQuery::toughness(state, perm);
    let controller = perm.controller;
    state.gain_life(controller, toughness);
}

pub(crate) fn double_target(state: &mut GameState, ctx: &EffectContext) {
    let Some(player) = ctx.target_player() else {
        return;
    };
    let life = state.players[player].life;
    let doubled = life.saturating_mul(2);
    state.players[player].life = doubled;
    state.log_event(format!("{player}'s life total is doubled from {life} to {doubled}."));
}

pub(crate) fn target_loses_game(state: &mut GameState, ctx: &EffectContext) {
    if let Some(player) = ctx.target_player() {
        state.players[player].lost = true;
        state.log_event(format!("{player} loses the game."));
    }
}
