use std::sync::Arc;

use tracing::debug;

use crate::cards::{Card, CardDefinition};
use crate::core::{GameState, ManaColor, ManaCost, Result};
use crate::effects::{Effect, EffectContext, Flow, TokenSpec};
use crate::interaction::{ColorPurpose, PendingInput};

pub(crate) fn create_tokens(state: &mut GameState, ctx: &EffectContext, count: u32, token: &TokenSpec) {
    let mut def = CardDefinition::creature(token.name.clone(), ManaCost::free(), token.power, token.toughness)
        .with_color(token.color);
    def.subtypes = token.subtypes.clone();
    def.keywords = token.keywords;
    let def = Arc::new(def);
    for _ in 0..count {
        let card = Card::token(state.alloc_id(), ctx.controller, def.clone());
        state.put_onto_battlefield(card, ctx.controller);
    }
}

pub(crate) fn extra_turn(state: &mut GameState, ctx: &EffectContext) {
    state.extra_turns.push_back(ctx.controller);
    state.log_event(format!("{} will take an extra turn after this one.", ctx.controller));
}

pub(crate) fn add_mana(state: &mut GameState, ctx: &EffectContext, color: ManaColor, amount: u32) {
    state.players[ctx.controller].mana_pool.add(color, amount);
    debug!(player = %ctx.controller, ?color, amount, "mana added");
}

pub(crate) fn choose_source_color(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    let Some(id) = ctx.source.filter(|id| state.permanent(*id).is_some()) else {
        return Ok(Flow::Continue);
    };
    state.pending = Some(PendingInput::ColorChoice {
        player: ctx.controller,
        purpose: ColorPurpose::SourceColor(id),
    });
    Ok(Flow::Suspend)
}

/// Ask whether to apply an optional effect. Accepting resumes with it.
pub(crate) fn offer(state: &mut GameState, ctx: &EffectContext, effect: &Effect) -> Flow {
    state.pending = Some(PendingInput::MayEffect {
        player: ctx.controller,
        effect: Box::new(effect.clone()),
    });
    Flow::Suspend
}
