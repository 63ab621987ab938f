//! Intent dispatch.
//!
//! `RulesEngine` is the one entry point that mutates a running match:
//!
//! 1. route the intent (answer, mana action, or priority action),
//! 2. apply it,
//! 3. settle and auto-pass until someone has a real decision.
//!
//! An illegal intent restores the state it started from, so callers never
//! see a half-applied action. An invariant violation restores it too and
//! then aborts the match.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_engine::cards::{Card, CardDefinition, Subtype};
//! use duel_engine::core::{EngineConfig, GameState, Intent, PlayerId};
//! use duel_engine::rules::RulesEngine;
//!
//! let mut state = GameState::new(EngineConfig::default().with_seed(3));
//! let forest = Arc::new(CardDefinition::basic_land(Subtype::Forest));
//! for player in PlayerId::both() {
//!     for _ in 0..20 {
//!         let card = Card::new(state.alloc_id(), player, forest.clone());
//!         state.players[player].library.push(card);
//!     }
//! }
//! RulesEngine::start(&mut state).unwrap();
//!
//! // The starting player stops in their first main phase with a land to play.
//! let first = state.active_player;
//! assert_eq!(state.priority_holder(), Some(first));
//! RulesEngine::apply(&mut state, first, &Intent::play(0)).unwrap();
//! assert_eq!(state.players[first].battlefield.len(), 1);
//! ```

use tracing::{debug, error, info};

use super::abilities::Abilities;
use super::casting::Casting;
use super::turn::TurnSequencer;
use crate::core::{EngineError, GameState, GameStatus, Intent, PlayerId, Result, Step};
use crate::interaction::Answers;

/// The rules state machine driver.
pub struct RulesEngine;

impl RulesEngine {
    /// Begin a match whose libraries are loaded: shuffle, pick the starting
    /// player, draw opening hands, and run to the first decision.
    pub fn start(state: &mut GameState) -> Result<()> {
        state.config.validate()?;
        if state.config.shuffle_libraries {
            for player in PlayerId::both() {
                state.players[player].library.shuffle(&mut state.rng);
            }
        }
        let first = if state.rng.flip_coin() { PlayerId::new(0) } else { PlayerId::new(1) };
        state.starting_player = first;
        state.active_player = first;
        state.turn_number = 1;
        state.step = Step::FIRST;
        state.log_event(format!("{first} goes first."));
        info!(%first, seed = state.rng.seed(), "match started");

        let hand_size = state.config.opening_hand_size;
        for player in PlayerId::starting_with(first) {
            state.draw_cards(player, hand_size);
        }
        TurnSequencer::enter_step(state)?;
        TurnSequencer::resolve_auto_pass(state)
    }

    /// Apply one intent from `player`.
    pub fn apply(state: &mut GameState, player: PlayerId, intent: &Intent) -> Result<()> {
        if !state.is_running() {
            return Err(EngineError::NotRunning);
        }
        let before = state.clone();
        let result = Self::dispatch(state, player, intent).and_then(|()| TurnSequencer::resolve_auto_pass(state));
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_illegal_action() => {
                debug!(%player, verb = intent.verb(), %err, "intent rejected");
                *state = before;
                Err(err)
            }
            Err(err) => {
                error!(%player, verb = intent.verb(), %err, "engine invariant violated; aborting match");
                *state = before;
                state.status = GameStatus::Aborted;
                state.pending = None;
                Err(err)
            }
        }
    }

    fn dispatch(state: &mut GameState, player: PlayerId, intent: &Intent) -> Result<()> {
        if let Intent::SetAutoStops { steps } = intent {
            state.players[player].auto_stops = steps.iter().copied().collect();
            return Ok(());
        }
        let answers = intent.is_answer()
            || matches!(intent, Intent::DeclareAttackers { .. } | Intent::DeclareBlockers { .. });
        let mana_action = Abilities::is_mana_action(state, player, intent);

        if let Some(pending) = &state.pending {
            if answers {
                return Answers::answer(state, player, intent);
            }
            // The prompted player may still make mana (to pay for a choice).
            if mana_action && pending.player() == player {
                return Self::perform(state, player, intent);
            }
            return Err(EngineError::InputPending);
        }
        if answers {
            return Err(EngineError::WrongPrompt);
        }
        if !mana_action && state.priority_holder() != Some(player) {
            return Err(EngineError::NotYourPriority);
        }
        Self::perform(state, player, intent)
    }

    fn perform(state: &mut GameState, player: PlayerId, intent: &Intent) -> Result<()> {
        match intent {
            Intent::PlayCard { hand_index, targets, x } => {
                Casting::play_card(state, player, *hand_index, targets, *x)
            }
            Intent::ActivateAbility { battlefield_index, ability_index, targets, x } => {
                Abilities::activate(state, player, *battlefield_index, *ability_index, targets, *x)
            }
            Intent::TapPermanent { permanent } => Abilities::tap_permanent(state, player, *permanent),
            Intent::SacrificePermanent { permanent } => Abilities::sacrifice_permanent(state, player, *permanent),
            Intent::PassPriority => TurnSequencer::pass_priority(state, player),
            Intent::SetAutoStops { .. }
            | Intent::DeclareAttackers { .. }
            | Intent::DeclareBlockers { .. }
            | Intent::ChooseColor { .. }
            | Intent::ChoosePermanent { .. }
            | Intent::ChooseHandCard { .. }
            | Intent::ChooseGraveyardCard { .. }
            | Intent::AnswerMay { .. }
            | Intent::ReorderLibrary { .. }
            | Intent::ChooseLibraryCard { .. } => Err(EngineError::invariant(format!(
                "{} reached the action dispatcher",
                intent.verb()
            ))),
        }
    }
}
