//! The legend rule.
//!
//! A player who controls two or more legendary permanents with the same
//! name chooses one to keep; the rest go to the graveyard. The choice is a
//! `PermanentChoice` prompt answered through `Answers`.

use tracing::debug;

use crate::core::{GameState, PlayerId};
use crate::effects::Target;
use crate::interaction::{ChoicePurpose, PendingInput};

/// Legend rule check.
pub struct LegendRule;

impl LegendRule {
    /// Raise a prompt for the first duplicated legendary name, checking the
    /// active player first. Returns true when a prompt was set.
    pub fn check(state: &mut GameState) -> bool {
        for player in PlayerId::starting_with(state.active_player) {
            if let Some(options) = Self::duplicates(state, player) {
                debug!(%player, count = options.len(), "legend rule applies");
                state.pending = Some(PendingInput::PermanentChoice {
                    player,
                    purpose: ChoicePurpose::LegendRule,
                    options,
                    optional: false,
                });
                return true;
            }
        }
        false
    }

    /// The permanents sharing the first legendary name `player` controls
    /// more than once, in battlefield order.
    fn duplicates(state: &GameState, player: PlayerId) -> Option<Vec<Target>> {
        let legends: Vec<_> = state.players[player]
            .battlefield
            .iter()
            .filter(|p| p.definition().is_legendary())
            .collect();
        legends.iter().enumerate().find_map(|(i, first)| {
            let same: Vec<Target> = legends[i..]
                .iter()
                .filter(|p| p.name() == first.name())
                .map(|p| Target::Permanent(p.id))
                .collect();
            (same.len() > 1).then_some(same)
        })
    }
}
