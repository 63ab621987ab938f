use crate::cards::Keyword;
use crate::core::{ControlChange, ControlDuration, GameState, Result};
use crate::effects::EffectContext;

/// Take the target until end of turn; it untaps and gains haste. The first
/// recorded controller is the one it returns to.
pub(crate) fn gain_until_end_of_turn(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    let Some(id) = ctx.target_permanent() else {
        return Ok(());
    };
    let original = state.require_permanent(id)?.controller;
    state.control_changes.entry(id).or_insert(ControlChange {
        original,
        duration: ControlDuration::EndOfTurn,
    });
    state.change_control(id, ctx.controller)?;
    let perm = state.require_permanent_mut(id)?;
    perm.tapped = false;
    perm.granted_keywords.insert(Keyword::Haste);
    Ok(())
}
