use crate::core::{GameState, Result};
use crate::effects::{EffectContext, Flow, Target};
use crate::interaction::{ColorPurpose, PendingInput};

pub(crate) fn shield_target(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    let Some(target) = ctx.target() else {
        return;
    };
    match target {
        Target::Player(player) => state.players[player].prevention_shield += amount,
        Target::Permanent(id) => match state.permanent_mut(id) {
            Some(perm) => perm.prevention_shield += amount,
            None => return,
        },
        Target::GraveyardCard(_) | Target::Spell(_) => return,
    }
    let name = state.describe_target(target);
    state.log_event(format!("The next {amount} damage to {name} will be prevented."));
}

pub(crate) fn next_damage(state: &mut GameState, amount: i32) {
    state.prevention.next_damage += amount;
    state.log_event(format!("The next {amount} damage will be prevented."));
}

pub(crate) fn all_combat_damage(state: &mut GameState) {
    state.prevention.all_combat_damage = true;
    state.log_event("All combat damage will be prevented this turn.");
}

pub(crate) fn choose_color(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    state.pending = Some(PendingInput::ColorChoice {
        player: ctx.controller,
        purpose: ColorPurpose::PreventDamage,
    });
    Ok(Flow::Suspend)
}

pub(crate) fn redirect_to_source(state: &mut GameState, ctx: &EffectContext) {
    let Some(perm) = ctx.source.and_then(|id| state.permanent(id)) else {
        return;
    };
    let (id, name) = (perm.id, perm.name().to_string());
    state.prevention.combat_redirect = Some(id);
    state.log_event(format!("Unblocked combat damage is dealt to {name} instead this turn."));
}
