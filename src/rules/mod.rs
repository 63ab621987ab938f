//! The rules state machine.
//!
//! ## Key Types
//!
//! - `RulesEngine`: Validates and applies intents, then runs to the next decision
//! - `TurnSequencer`: Steps, priority passes, auto-pass
//! - `Casting` / `Abilities`: Putting spells and abilities on the stack
//! - `StateBasedActions` / `LegendRule`: Checks run before every decision
//! - `Damage` / `Destruction`: Damage with prevention, destroy with regeneration
//!
//! After anything changes the engine *settles*: state-based actions run to
//! a fixpoint, then fired triggers are put on the stack (or prompted for),
//! and only then is the legend rule checked.
//! A resolution waiting on a prompt is left alone until it is answered.

mod abilities;
mod casting;
mod damage;
mod destruction;
mod engine;
mod legend;
mod sba;
mod turn;

pub use abilities::Abilities;
pub use casting::Casting;
pub use damage::{Damage, DamageSource};
pub use destruction::Destruction;
pub use engine::RulesEngine;
pub use legend::LegendRule;
pub use sba::StateBasedActions;
pub use turn::TurnSequencer;

use crate::core::{GameState, Result};
use crate::triggers::Triggers;

/// Bring the state to a point where a player can decide: state-based
/// actions, then triggers, then the legend rule.
///
/// Enter-the-battlefield triggers of a new legend are prompted before its
/// controller has to choose which copy to keep.
pub fn settle(state: &mut GameState) -> Result<()> {
    if state.suspended.is_some() {
        return Ok(());
    }
    StateBasedActions::check(state)?;
    if !state.is_running() || state.pending.is_some() {
        return Ok(());
    }
    Triggers::flush(state);
    if !Triggers::prompt_next(state) {
        LegendRule::check(state);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, EffectSlot};
    use crate::core::{EngineConfig, EntityId, Intent, PlayerId};
    use crate::effects::{Effect, Target};
    use crate::interaction::{Answers, ChoicePurpose, PendingInput};

    fn put(state: &mut GameState, player: PlayerId, def: &Arc<CardDefinition>) -> EntityId {
        let card = Card::new(state.alloc_id(), player, def.clone());
        state.put_onto_battlefield(card, player)
    }

    /// A legend that pings any target when it enters.
    fn pyromancer() -> Arc<CardDefinition> {
        Arc::new(
            CardDefinition::creature("Jaya's Apprentice", "{1}{R}".parse().unwrap(), 1, 1)
                .legendary()
                .with_effect(EffectSlot::OnEnter, Effect::damage(1)),
        )
    }

    /// Test that a second legend's targeted enter trigger is asked for
    /// before the legend rule.
    #[test]
    fn test_enter_trigger_prompted_before_legend_rule() {
        let mut state = GameState::new(EngineConfig::default());
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        let def = pyromancer();
        put(&mut state, p0, &def);
        state.triggers.pending.clear();
        put(&mut state, p0, &def);

        settle(&mut state).unwrap();
        let options = match &state.pending {
            Some(PendingInput::PermanentChoice { purpose: ChoicePurpose::TriggerTarget(_), options, .. }) => {
                options.clone()
            }
            other => panic!("expected a trigger target prompt, got {other:?}"),
        };
        assert_eq!(state.players[p0].battlefield.len(), 2);

        let face = options.iter().position(|t| *t == Target::Player(p1)).unwrap();
        Answers::answer(&mut state, p0, &Intent::ChoosePermanent { choice: Some(face) }).unwrap();
        assert_eq!(state.stack.len(), 1);

        settle(&mut state).unwrap();
        assert!(matches!(
            state.pending,
            Some(PendingInput::PermanentChoice { purpose: ChoicePurpose::LegendRule, player, .. }) if player == p0
        ));
    }

    /// Test that the legend rule waits while another prompt is open.
    #[test]
    fn test_legend_prompt_waits_for_other_prompts() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let legend = Arc::new(CardDefinition::creature("Tolsimir", "{1}{G}{W}".parse().unwrap(), 3, 3).legendary());
        put(&mut state, p0, &legend);
        put(&mut state, p0, &legend);
        state.pending = Some(PendingInput::DeclareAttackers { player: p0 });

        settle(&mut state).unwrap();
        assert!(matches!(state.pending, Some(PendingInput::DeclareAttackers { .. })));

        state.pending = None;
        settle(&mut state).unwrap();
        assert!(matches!(
            state.pending,
            Some(PendingInput::PermanentChoice { purpose: ChoicePurpose::LegendRule, .. })
        ));
    }
}
