use crate::core::{GameState, Result};
use crate::effects::{EffectContext, Target};
use crate::zones::{Zone, ZonePosition};

/// Remove the targeted entry. A countered spell goes to its owner's
/// graveyard; countered abilities and copies just vanish.
pub(crate) fn counter(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    let Some(Target::Spell(id)) = ctx.target() else {
        return Ok(());
    };
    let Some(index) = state.stack.iter().position(|e| e.id == id) else {
        return Ok(());
    };
    let entry = state.stack.remove(index);
    state.log_event(format!("{} is countered.", entry.description));
    if entry.kind.is_spell() && !entry.is_copy {
        state.put_card(entry.card, Zone::Graveyard, ZonePosition::Top)?;
    }
    Ok(())
}

/// Put a copy of the targeted spell on the stack under the controller.
pub(crate) fn copy(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    let Some(Target::Spell(id)) = ctx.target() else {
        return Ok(());
    };
    let Some(original) = state.stack_entry(id).cloned() else {
        return Ok(());
    };
    let copy_id = state.alloc_id();
    let copy = original.copy_for(copy_id, ctx.controller);
    state.log_event(format!("{} copies {}.", ctx.controller, original.description));
    state.stack.push(copy);
    state.priority.clear();
    Ok(())
}
