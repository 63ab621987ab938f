//! Turn steps.
//!
//! A turn is a fixed cyclic sequence of steps. Untapping happens as part of
//! the turn roll-over, so there is no separate untap step.

use serde::{Deserialize, Serialize};

/// A step of the turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Upkeep,
    Draw,
    PrecombatMain,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndOfCombat,
    PostcombatMain,
    EndStep,
    Cleanup,
}

impl Step {
    /// All steps in turn order.
    pub const ALL: [Step; 10] = [
        Step::Upkeep,
        Step::Draw,
        Step::PrecombatMain,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::CombatDamage,
        Step::EndOfCombat,
        Step::PostcombatMain,
        Step::EndStep,
        Step::Cleanup,
    ];

    /// The first step of every turn.
    pub const FIRST: Step = Step::Upkeep;

    /// The following step, or `None` after cleanup (the turn ends).
    #[must_use]
    pub const fn next(self) -> Option<Step> {
        match self {
            Step::Upkeep => Some(Step::Draw),
            Step::Draw => Some(Step::PrecombatMain),
            Step::PrecombatMain => Some(Step::DeclareAttackers),
            Step::DeclareAttackers => Some(Step::DeclareBlockers),
            Step::DeclareBlockers => Some(Step::CombatDamage),
            Step::CombatDamage => Some(Step::EndOfCombat),
            Step::EndOfCombat => Some(Step::PostcombatMain),
            Step::PostcombatMain => Some(Step::EndStep),
            Step::EndStep => Some(Step::Cleanup),
            Step::Cleanup => None,
        }
    }

    /// Main phases allow sorcery-speed actions.
    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Step::PrecombatMain | Step::PostcombatMain)
    }

    /// Steps that belong to the combat phase.
    #[must_use]
    pub const fn is_combat(self) -> bool {
        matches!(
            self,
            Step::DeclareAttackers | Step::DeclareBlockers | Step::CombatDamage | Step::EndOfCombat
        )
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Step::Upkeep => "Upkeep",
            Step::Draw => "Draw",
            Step::PrecombatMain => "Precombat Main",
            Step::DeclareAttackers => "Declare Attackers",
            Step::DeclareBlockers => "Declare Blockers",
            Step::CombatDamage => "Combat Damage",
            Step::EndOfCombat => "End of Combat",
            Step::PostcombatMain => "Postcombat Main",
            Step::EndStep => "End Step",
            Step::Cleanup => "Cleanup",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
