//! Turn structure integration tests: automatic passing, losing by drawing
//! from an empty library, mana emptying, and the legend rule prompt.

use std::sync::Arc;

use proptest::prelude::*;

use duel_engine::cards::{Card, CardDefinition, Subtype};
use duel_engine::core::{EngineConfig, EngineError, GameState, GameStatus, Intent, ManaColor, PlayerId, Step};
use duel_engine::interaction::{ChoicePurpose, PendingInput};
use duel_engine::rules::{RulesEngine, TurnSequencer};

fn quiet_config() -> EngineConfig {
    EngineConfig::default()
        .without_shuffle()
        .with_opening_hand_size(0)
        .with_default_auto_stops(Vec::new())
}

fn fill_libraries(state: &mut GameState, count: usize) {
    let island = Arc::new(CardDefinition::basic_land(Subtype::Island));
    for player in PlayerId::both() {
        for _ in 0..count {
            let card = Card::new(state.alloc_id(), player, island.clone());
            state.players[player].library.push(card);
        }
    }
}

// =============================================================================
// Automatic passing
// =============================================================================

/// Test that with nothing to do the engine runs to the first real decision:
/// the second player's main phase with a freshly drawn land.
#[test]
fn test_auto_pass_runs_to_first_decision() {
    let mut state = GameState::new(quiet_config());
    fill_libraries(&mut state, 10);
    RulesEngine::start(&mut state).unwrap();

    let first = state.starting_player;
    let second = first.opponent();
    assert_eq!(state.turn_number, 2);
    assert_eq!(state.active_player, second);
    assert_eq!(state.step, Step::PrecombatMain);
    assert_eq!(state.priority_holder(), Some(second));
    assert_eq!(state.players[second].hand.len(), 1);
    assert!(state.players[first].hand.is_empty());
    assert!(state.log.iter().any(|line| line == &format!("{first} skips the first draw.")));
}

/// Test that drawing from an empty library loses at the next check.
#[test]
fn test_empty_library_draw_loses() {
    let mut state = GameState::new(quiet_config());
    RulesEngine::start(&mut state).unwrap();

    let first = state.starting_player;
    assert_eq!(state.status, GameStatus::Finished { winner: Some(first) });
    assert!(state
        .log
        .iter()
        .any(|line| line == &format!("{} loses the game.", first.opponent())));
    assert_eq!(
        RulesEngine::apply(&mut state, first, &Intent::PassPriority),
        Err(EngineError::NotRunning)
    );
}

/// Test that an auto-stop set mid-game stops automatic passing there.
#[test]
fn test_auto_stop_holds_priority() {
    let mut state = GameState::new(quiet_config());
    fill_libraries(&mut state, 10);
    RulesEngine::start(&mut state).unwrap();
    let second = state.active_player;
    let first = second.opponent();

    RulesEngine::apply(&mut state, first, &Intent::SetAutoStops { steps: vec![Step::EndStep] }).unwrap();
    RulesEngine::apply(&mut state, second, &Intent::play(0)).unwrap();

    assert_eq!(state.step, Step::EndStep);
    assert_eq!(state.priority_holder(), Some(first));
    assert_eq!(state.players[second].battlefield.len(), 1);
}

proptest! {
    /// Test that no mana survives a step boundary.
    #[test]
    fn prop_mana_empties_between_steps(red in 0u32..5, green in 0u32..5, steps in 1usize..24) {
        let mut state = GameState::new(quiet_config());
        fill_libraries(&mut state, 5);
        for _ in 0..steps {
            for player in PlayerId::both() {
                state.players[player].mana_pool.add(ManaColor::Red, red);
                state.players[player].mana_pool.add(ManaColor::Green, green);
            }
            TurnSequencer::advance_step(&mut state).unwrap();
            for player in PlayerId::both() {
                prop_assert!(state.players[player].mana_pool.is_empty());
            }
        }
    }
}

// =============================================================================
// Legend rule
// =============================================================================

/// Test that a second copy of a legend prompts its controller, and the
/// answer keeps the chosen one.
#[test]
fn test_legend_rule_prompt_and_answer() {
    let mut state = GameState::new(EngineConfig::default().without_shuffle());
    state.step = Step::PrecombatMain;
    let p0 = PlayerId::new(0);
    let isamaru = Arc::new(
        CardDefinition::creature("Isamaru", "{W}".parse().unwrap(), 2, 2).legendary(),
    );
    let old = Card::new(state.alloc_id(), p0, isamaru.clone());
    let old = state.put_onto_battlefield(old, p0);
    let new = Card::new(state.alloc_id(), p0, isamaru);
    state.players[p0].hand.push(new);
    state.players[p0].mana_pool.add(ManaColor::White, 1);

    RulesEngine::apply(&mut state, p0, &Intent::play(0)).unwrap();
    RulesEngine::apply(&mut state, p0, &Intent::PassPriority).unwrap();
    RulesEngine::apply(&mut state, p0.opponent(), &Intent::PassPriority).unwrap();

    assert!(matches!(
        state.pending,
        Some(PendingInput::PermanentChoice { player, purpose: ChoicePurpose::LegendRule, .. }) if player == p0
    ));
    assert_eq!(
        RulesEngine::apply(&mut state, p0, &Intent::PassPriority),
        Err(EngineError::InputPending)
    );

    RulesEngine::apply(&mut state, p0, &Intent::ChoosePermanent { choice: Some(1) }).unwrap();
    assert!(state.pending.is_none());
    assert!(state.permanent(old).is_none());
    assert_eq!(state.players[p0].battlefield.len(), 1);
    assert_eq!(state.players[p0].graveyard.len(), 1);
    assert!(state.log.iter().any(|line| line == "Player 0 keeps Isamaru."));
}
