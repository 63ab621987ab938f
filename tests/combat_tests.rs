//! Combat integration tests.
//!
//! Each scenario starts in the first main phase, passes into combat, and
//! answers the declaration prompts through the engine.

use std::sync::Arc;

use duel_engine::cards::{Card, CardDefinition, Keyword};
use duel_engine::core::{EngineConfig, EntityId, GameState, Intent, PlayerId, Step};
use duel_engine::interaction::PendingInput;
use duel_engine::rules::RulesEngine;

const ATTACKER: PlayerId = PlayerId::new(0);
const DEFENDER: PlayerId = PlayerId::new(1);

fn main_phase() -> GameState {
    let mut state = GameState::new(EngineConfig::default().without_shuffle());
    state.step = Step::PrecombatMain;
    state
}

/// A creature that has been under its controller's control since the turn
/// began.
fn creature(
    state: &mut GameState,
    controller: PlayerId,
    name: &str,
    power: i32,
    toughness: i32,
    keywords: &[Keyword],
) -> EntityId {
    let mut def = CardDefinition::creature(name, "{2}".parse().unwrap(), power, toughness);
    for keyword in keywords {
        def = def.with_keyword(*keyword);
    }
    let card = Card::new(state.alloc_id(), controller, Arc::new(def));
    let id = state.put_onto_battlefield(card, controller);
    state.permanent_mut(id).unwrap().summoning_sick = false;
    id
}

/// Pass out of the main phase and declare the first creature as attacker.
fn attack_with_first(state: &mut GameState) {
    RulesEngine::apply(state, ATTACKER, &Intent::PassPriority).unwrap();
    RulesEngine::apply(state, DEFENDER, &Intent::PassPriority).unwrap();
    assert_eq!(state.step, Step::DeclareAttackers);
    assert!(matches!(state.pending, Some(PendingInput::DeclareAttackers { .. })));

    RulesEngine::apply(state, ATTACKER, &Intent::DeclareAttackers { attackers: vec![0] }).unwrap();
}

// =============================================================================
// Blocked combat
// =============================================================================

/// Test that a first striker too small to kill its blocker dies to the
/// blocker's regular damage.
#[test]
fn test_first_strike_into_bigger_blocker() {
    let mut state = main_phase();
    let knight = creature(&mut state, ATTACKER, "White Knight", 2, 2, &[Keyword::FirstStrike]);
    let giant = creature(&mut state, DEFENDER, "Hill Giant", 3, 3, &[]);

    attack_with_first(&mut state);
    assert!(matches!(state.pending, Some(PendingInput::DeclareBlockers { player }) if player == DEFENDER));
    RulesEngine::apply(&mut state, DEFENDER, &Intent::DeclareBlockers { blocks: vec![(0, 0)] }).unwrap();

    assert_eq!(state.step, Step::PostcombatMain);
    assert!(state.permanent(knight).is_none());
    assert_eq!(state.players[ATTACKER].graveyard.len(), 1);
    let giant = state.permanent(giant).unwrap();
    assert_eq!(giant.damage, 2);
    assert!(!giant.blocking);

    let knight_hit = state
        .log
        .iter()
        .position(|line| line == "White Knight deals 2 damage to Hill Giant.")
        .unwrap();
    let giant_hit = state
        .log
        .iter()
        .position(|line| line == "Hill Giant deals 3 damage to White Knight.")
        .unwrap();
    assert!(knight_hit < giant_hit);
}

/// Test that creatures dealing each other lethal damage both die.
#[test]
fn test_mutual_lethal_damage() {
    let mut state = main_phase();
    let attacker = creature(&mut state, ATTACKER, "Grizzly Bears", 2, 2, &[]);
    let blocker = creature(&mut state, DEFENDER, "Runeclaw Bear", 2, 2, &[]);

    attack_with_first(&mut state);
    RulesEngine::apply(&mut state, DEFENDER, &Intent::DeclareBlockers { blocks: vec![(0, 0)] }).unwrap();

    assert!(state.permanent(attacker).is_none());
    assert!(state.permanent(blocker).is_none());
    assert_eq!(state.players[ATTACKER].graveyard.len(), 1);
    assert_eq!(state.players[DEFENDER].graveyard.len(), 1);
    assert_eq!(state.players[DEFENDER].life, 20);
}

/// Test that a chump block keeps the defender's life intact unless the
/// attacker tramples over.
#[test]
fn test_trample_over_chump_blocker() {
    let mut state = main_phase();
    creature(&mut state, ATTACKER, "Craw Wurm", 6, 4, &[Keyword::Trample]);
    creature(&mut state, DEFENDER, "Llanowar Elves", 1, 1, &[]);

    attack_with_first(&mut state);
    RulesEngine::apply(&mut state, DEFENDER, &Intent::DeclareBlockers { blocks: vec![(0, 0)] }).unwrap();

    assert!(state.players[DEFENDER].battlefield.is_empty());
    assert_eq!(state.players[DEFENDER].life, 15);
}

// =============================================================================
// Unblocked combat
// =============================================================================

/// Test that with no possible blockers the defender is never prompted and
/// takes the damage.
#[test]
fn test_unblocked_attacker_hits_player() {
    let mut state = main_phase();
    let bears = creature(&mut state, ATTACKER, "Grizzly Bears", 2, 2, &[]);

    attack_with_first(&mut state);

    assert_eq!(state.step, Step::PostcombatMain);
    assert!(state.pending.is_none());
    assert_eq!(state.players[DEFENDER].life, 18);
    let bears = state.permanent(bears).unwrap();
    assert!(bears.tapped);
    assert!(!bears.attacking);
}

/// Test that an illegal attacker is rejected and the prompt stays open.
#[test]
fn test_summoning_sick_creature_cannot_attack() {
    let mut state = main_phase();
    creature(&mut state, ATTACKER, "Grizzly Bears", 2, 2, &[]);
    let fresh = Card::new(
        state.alloc_id(),
        ATTACKER,
        Arc::new(CardDefinition::creature("Hill Giant", "{3}{R}".parse().unwrap(), 3, 3)),
    );
    state.put_onto_battlefield(fresh, ATTACKER);

    RulesEngine::apply(&mut state, ATTACKER, &Intent::PassPriority).unwrap();
    RulesEngine::apply(&mut state, DEFENDER, &Intent::PassPriority).unwrap();

    let err = RulesEngine::apply(&mut state, ATTACKER, &Intent::DeclareAttackers { attackers: vec![1] }).unwrap_err();
    assert!(err.is_illegal_action());
    assert!(matches!(state.pending, Some(PendingInput::DeclareAttackers { .. })));
}
