use crate::core::{GameState, PlayerId, Result};
use crate::effects::{EffectContext, Flow};
use crate::interaction::{DiscardReason, PendingInput};
use crate::zones::ZonePosition;

fn count(amount: i32) -> usize {
    usize::try_from(amount).unwrap_or(0)
}

pub(crate) fn draw(state: &mut GameState, player: PlayerId, amount: i32) {
    state.draw_cards(player, count(amount));
}

/// The controller discards `amount` cards of their choice. A hand that is
/// not larger than the amount is discarded whole without asking.
pub(crate) fn discard(state: &mut GameState, ctx: &EffectContext, amount: i32) -> Result<Flow> {
    let player = ctx.controller;
    let amount = count(amount);
    let hand = state.players[player].hand.len();
    if amount == 0 {
        return Ok(Flow::Continue);
    }
    if hand <= amount {
        for index in (0..hand).rev() {
            state.discard(player, index)?;
        }
        return Ok(Flow::Continue);
    }
    state.pending = Some(PendingInput::Discard {
        player,
        remaining: amount,
        reason: DiscardReason::Effect,
    });
    Ok(Flow::Suspend)
}

/// Reveal the target's hand; the controller picks a nonland card from it.
pub(crate) fn choose_from_target_hand(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    let Some(target_player) = ctx.target_player() else {
        return Ok(Flow::Continue);
    };
    state.log_event(format!("{} looks at {target_player}'s hand.", ctx.controller));
    let options: Vec<(usize, String)> = state.players[target_player]
        .hand
        .iter()
        .enumerate()
        .filter(|(_, card)| !card.definition.is_land())
        .map(|(index, card)| (index, card.name().to_string()))
        .collect();
    if options.is_empty() {
        state.log_event(format!("{target_player} has no nonland cards in hand."));
        return Ok(Flow::Continue);
    }
    state.pending = Some(PendingInput::RevealedHandChoice {
        player: ctx.controller,
        target_player,
        options,
    });
    Ok(Flow::Suspend)
}

pub(crate) fn mill_target(state: &mut GameState, ctx: &EffectContext, amount: i32) {
    if let Some(player) = ctx.target_player() {
        state.mill(player, count(amount));
    }
}

pub(crate) fn shuffle_graveyard_into_library(state: &mut GameState, player: PlayerId) {
    let board = &mut state.players[player];
    let cards = board.graveyard.drain_all();
    let moved = cards.len();
    for card in cards {
        board.library.put(card, ZonePosition::Bottom);
    }
    board.library.shuffle(&mut state.rng);
    state.log_event(format!("{player} shuffles {moved} card(s) from their graveyard into their library."));
}

pub(crate) fn search_basic_land(state: &mut GameState, ctx: &EffectContext) -> Result<Flow> {
    let player = ctx.controller;
    let options: Vec<_> = state.players[player]
        .library
        .iter()
        .filter(|card| card.definition.is_basic_land())
        .map(|card| card.id)
        .collect();
    if options.is_empty() {
        state.log_event(format!("{player} finds no basic land."));
        let board = &mut state.players[player];
        board.library.shuffle(&mut state.rng);
        return Ok(Flow::Continue);
    }
    state.pending = Some(PendingInput::LibrarySearch { player, options });
    Ok(Flow::Suspend)
}

pub(crate) fn reorder_top(state: &mut GameState, ctx: &EffectContext, requested: usize) -> Result<Flow> {
    let player = ctx.controller;
    let count = requested.min(state.players[player].library.len());
    if count <= 1 {
        return Ok(Flow::Continue);
    }
    state.log_event(format!("{player} looks at the top {count} cards of their library."));
    state.pending = Some(PendingInput::LibraryReorder { player, count });
    Ok(Flow::Suspend)
}
