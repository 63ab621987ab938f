//! Per-player views of a match.
//!
//! A snapshot shows what one player may see: every battlefield, the stack,
//! life totals, graveyards and exile, their own hand (only the size of the
//! opponent's), library sizes, the step and priority, their own prompt, and
//! the log lines since the previous broadcast.

use serde::Serialize;

use crate::cards::{Card, Keyword, Permanent};
use crate::core::{EntityId, GameState, GameStatus, ManaPool, PlayerId, Step};
use crate::interaction::PendingInput;
use crate::rules::Casting;
use crate::stack::{StackEntry, StackEntryKind};
use crate::statics::StaticQuery;

/// A card as shown in a hand or graveyard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: EntityId,
    pub name: String,
    pub mana_value: u32,
}

impl CardView {
    fn of(card: &Card) -> Self {
        Self {
            id: card.id,
            name: card.name().to_string(),
            mana_value: card.definition.mana_value(),
        }
    }
}

/// A permanent with its current (static-adjusted) characteristics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PermanentView {
    pub id: EntityId,
    pub name: String,
    pub controller: PlayerId,
    pub owner: PlayerId,
    pub tapped: bool,
    pub attacking: bool,
    pub blocking: bool,
    pub summoning_sick: bool,
    /// Present while the permanent is a creature.
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub damage: i32,
    pub loyalty: Option<i32>,
    pub counters: i32,
    pub keywords: Vec<Keyword>,
    pub attached_to: Option<EntityId>,
    pub is_token: bool,
}

impl PermanentView {
    fn of(state: &GameState, perm: &Permanent) -> Self {
        let chars = StaticQuery::characteristics(state, perm);
        Self {
            id: perm.id,
            name: perm.name().to_string(),
            controller: perm.controller,
            owner: perm.owner(),
            tapped: perm.tapped,
            attacking: perm.attacking,
            blocking: perm.blocking,
            summoning_sick: perm.summoning_sick,
            power: chars.is_creature.then_some(chars.power),
            toughness: chars.is_creature.then_some(chars.toughness),
            damage: perm.damage,
            loyalty: perm.definition().loyalty.map(|_| perm.loyalty),
            counters: perm.plus_counters,
            keywords: chars.keywords.iter().collect(),
            attached_to: perm.attached_to,
            is_token: perm.is_token(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StackView {
    pub id: EntityId,
    pub kind: StackEntryKind,
    pub description: String,
    pub controller: PlayerId,
    pub targets: Vec<String>,
}

impl StackView {
    fn of(state: &GameState, entry: &StackEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            description: entry.description.clone(),
            controller: entry.controller,
            targets: entry.targets.iter().map(|t| state.describe_target(*t)).collect(),
        }
    }
}

/// One player's public board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub life: i32,
    pub hand_size: usize,
    pub library_size: usize,
    pub battlefield: Vec<PermanentView>,
    pub graveyard: Vec<CardView>,
    pub exile: Vec<CardView>,
    pub mana_pool: ManaPool,
}

/// Everything one player is shown after an intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub viewer: PlayerId,
    pub status: GameStatus,
    pub turn_number: u32,
    pub step: Step,
    pub active_player: PlayerId,
    pub priority: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    /// Top of the stack is the last element.
    pub stack: Vec<StackView>,
    pub hand: Vec<CardView>,
    /// Only the viewer's own prompt.
    pub pending: Option<PendingInput>,
    pub prompt: Option<String>,
    /// Hand indices the viewer can play right now.
    pub playable: Vec<usize>,
    pub log: Vec<String>,
}

impl GameSnapshot {
    /// Build `viewer`'s snapshot, with log lines from index `log_from` on.
    #[must_use]
    pub fn for_player(state: &GameState, viewer: PlayerId, log_from: usize) -> Self {
        let players = PlayerId::both()
            .map(|player| {
                let board = &state.players[player];
                PlayerView {
                    player,
                    life: board.life,
                    hand_size: board.hand.len(),
                    library_size: board.library.len(),
                    battlefield: board.battlefield.iter().map(|p| PermanentView::of(state, p)).collect(),
                    graveyard: board.graveyard.iter().map(CardView::of).collect(),
                    exile: board.exile.iter().map(CardView::of).collect(),
                    mana_pool: board.mana_pool.clone(),
                }
            })
            .collect();

        let pending = state.pending.as_ref().filter(|p| p.player() == viewer).cloned();
        let has_priority = state.pending.is_none() && state.priority_holder() == Some(viewer);
        Self {
            viewer,
            status: state.status,
            turn_number: state.turn_number,
            step: state.step,
            active_player: state.active_player,
            priority: state.priority_holder(),
            players,
            stack: state.stack.iter().map(|e| StackView::of(state, e)).collect(),
            hand: state.players[viewer].hand.iter().map(CardView::of).collect(),
            prompt: pending.as_ref().map(PendingInput::describe),
            pending,
            playable: if has_priority && state.is_running() {
                Casting::playable_indices(state, viewer)
            } else {
                Vec::new()
            },
            log: state.log.iter().skip(log_from).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::EngineConfig;
    use crate::interaction::DiscardReason;

    #[test]
    fn test_hidden_information() {
        let mut state = GameState::new(EngineConfig::default());
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        let def = Arc::new(CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2));
        for player in [p0, p1] {
            let card = Card::new(state.alloc_id(), player, def.clone());
            state.players[player].hand.push(card);
        }
        state.pending = Some(PendingInput::Discard { player: p1, remaining: 1, reason: DiscardReason::Effect });

        let view = GameSnapshot::for_player(&state, p0, 0);
        assert_eq!(view.hand.len(), 1);
        assert_eq!(view.hand[0].name, "Grizzly Bears");
        assert_eq!(view.players[1].hand_size, 1);
        assert!(view.pending.is_none());

        let view = GameSnapshot::for_player(&state, p1, 0);
        assert!(view.pending.is_some());
        assert_eq!(view.prompt.as_deref(), Some("Discard 1 card(s)"));
    }

    #[test]
    fn test_serializes_to_json() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let card = Card::new(
            state.alloc_id(),
            p0,
            Arc::new(CardDefinition::creature("Serra Angel", "{3}{W}{W}".parse().unwrap(), 4, 4).with_keyword(Keyword::Flying)),
        );
        state.put_onto_battlefield(card, p0);

        let view = GameSnapshot::for_player(&state, p0, 0);
        let json = serde_json::to_value(&view).unwrap();
        let angel = &json["players"][0]["battlefield"][0];
        assert_eq!(angel["name"], "Serra Angel");
        assert_eq!(angel["power"], 4);
        assert_eq!(angel["keywords"][0], "Flying");
        assert_eq!(json["log"][0], "Serra Angel enters the battlefield.");
    }
}
