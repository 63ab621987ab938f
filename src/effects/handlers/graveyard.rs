use crate::cards::{CardDefinition, CardType};
use crate::core::{EntityId, GameState, Result};
use crate::effects::{EffectContext, Flow, Target};
use crate::interaction::{GraveyardPurpose, PendingInput};
use crate::zones::{Zone, ZonePosition};

pub(crate) fn return_target_to_hand(state: &mut GameState, ctx: &EffectContext) -> Result<()> {
    let Some(Target::GraveyardCard(id)) = ctx.target() else {
        return Ok(());
    };
    let Some(card) = state.take_graveyard_card(id) else {
        return Ok(());
    };
    state.log_event(format!("{} returns to {}'s hand.", card.name(), card.owner));
    state.put_card(card, Zone::Hand, ZonePosition::Top)
}

/// Offer the controller's graveyard cards that pass `filter`. Nothing to
/// offer means nothing to ask.
fn offer(
    state: &mut GameState,
    ctx: &EffectContext,
    purpose: GraveyardPurpose,
    filter: impl Fn(&CardDefinition) -> bool,
) -> Flow {
    let player = ctx.controller;
    let options: Vec<EntityId> = state.players[player]
        .graveyard
        .iter()
        .filter(|card| filter(card.definition.as_ref()))
        .map(|card| card.id)
        .collect();
    if options.is_empty() {
        return Flow::Continue;
    }
    state.pending = Some(PendingInput::GraveyardChoice { player, purpose, options });
    Flow::Suspend
}

pub(crate) fn offer_creature(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    Ok(offer(state, ctx, GraveyardPurpose::ToBattlefield, CardDefinition::is_creature))
}

pub(crate) fn offer_artifact(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    Ok(offer(state, ctx, GraveyardPurpose::ToHand, |def| def.has_type(CardType::Artifact)))
}

pub(crate) fn exile_targets(state: &mut GameState, ctx: &EffectContext) {
    for target in ctx.targets.iter().flatten() {
        let Target::GraveyardCard(id) = *target else {
            continue;
        };
        if let Some(card) = state.take_graveyard_card(id) {
            state.log_event(format!("{} is exiled.", card.name()));
            state.players[card.owner].exile.push(card);
        }
    }
}
