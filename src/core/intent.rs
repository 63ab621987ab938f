//! Intents: the verbs a player can send to a match.
//!
//! An intent either applies fully or is rejected with no state change.
//! Hand and battlefield references are indices into the acting player's
//! own piles as shown in their latest snapshot; targets use entity ids.
//!
//! ```
//! use duel_engine::core::{Intent, PlayerId};
//! use duel_engine::effects::Target;
//!
//! let bolt_face = Intent::play_targeting(0, Target::Player(PlayerId::new(1)));
//! assert!(!bolt_face.is_answer());
//! assert!(Intent::AnswerMay { accept: true }.is_answer());
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::step::Step;
use crate::cards::Color;
use crate::effects::Target;

/// A player request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    // === Actions (require priority) ===

    /// Play a land or cast a spell from hand.
    PlayCard {
        hand_index: usize,
        targets: SmallVec<[Target; 3]>,
        x: u32,
    },
    /// Activate an ability of one of your permanents.
    ActivateAbility {
        battlefield_index: usize,
        ability_index: usize,
        targets: SmallVec<[Target; 3]>,
        x: u32,
    },
    /// Tap a permanent (battlefield index) for its on-tap effect, usually mana.
    TapPermanent { permanent: usize },
    /// Sacrifice a permanent (battlefield index) for its on-sacrifice effect.
    SacrificePermanent { permanent: usize },
    PassPriority,

    // === Combat declarations ===

    /// Battlefield indices of the attacking creatures.
    DeclareAttackers { attackers: Vec<usize> },
    /// (blocker index on your battlefield, attacker index on the active
    /// player's battlefield) pairs.
    DeclareBlockers { blocks: Vec<(usize, usize)> },

    // === Settings ===

    SetAutoStops { steps: Vec<Step> },

    // === Prompt answers ===

    ChooseColor { color: Color },
    /// Index into the prompt's options; `None` declines when allowed.
    ChoosePermanent { choice: Option<usize> },
    ChooseHandCard { index: usize },
    ChooseGraveyardCard { choice: Option<usize> },
    AnswerMay { accept: bool },
    /// New order of the revealed top cards (indices into them).
    ReorderLibrary { order: Vec<usize> },
    ChooseLibraryCard { choice: Option<usize> },
}

impl Intent {
    /// Play a card with no targets.
    #[must_use]
    pub fn play(hand_index: usize) -> Self {
        Intent::PlayCard {
            hand_index,
            targets: SmallVec::new(),
            x: 0,
        }
    }

    /// Cast a card with a single target.
    #[must_use]
    pub fn play_targeting(hand_index: usize, target: Target) -> Self {
        Intent::PlayCard {
            hand_index,
            targets: smallvec::smallvec![target],
            x: 0,
        }
    }

    /// Activate an ability with no targets.
    #[must_use]
    pub fn activate(battlefield_index: usize, ability_index: usize) -> Self {
        Intent::ActivateAbility {
            battlefield_index,
            ability_index,
            targets: SmallVec::new(),
            x: 0,
        }
    }

    /// True for verbs that answer a pending prompt.
    #[must_use]
    pub fn is_answer(&self) -> bool {
        matches!(
            self,
            Intent::ChooseColor { .. }
                | Intent::ChoosePermanent { .. }
                | Intent::ChooseHandCard { .. }
                | Intent::ChooseGraveyardCard { .. }
                | Intent::AnswerMay { .. }
                | Intent::ReorderLibrary { .. }
                | Intent::ChooseLibraryCard { .. }
        )
    }

    /// Short verb name for logs.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Intent::PlayCard { .. } => "play-card",
            Intent::ActivateAbility { .. } => "activate-ability",
            Intent::TapPermanent { .. } => "tap-permanent",
            Intent::SacrificePermanent { .. } => "sacrifice-permanent",
            Intent::PassPriority => "pass-priority",
            Intent::DeclareAttackers { .. } => "declare-attackers",
            Intent::DeclareBlockers { .. } => "declare-blockers",
            Intent::SetAutoStops { .. } => "set-auto-stops",
            Intent::ChooseColor { .. } => "choose-color",
            Intent::ChoosePermanent { .. } => "choose-permanent",
            Intent::ChooseHandCard { .. } => "choose-hand-card",
            Intent::ChooseGraveyardCard { .. } => "choose-graveyard-card",
            Intent::AnswerMay { .. } => "answer-may",
            Intent::ReorderLibrary { .. } => "reorder-library",
            Intent::ChooseLibraryCard { .. } => "choose-library-card",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    #[test]
    fn test_helpers() {
        match Intent::play_targeting(2, Target::Player(PlayerId::new(0))) {
            Intent::PlayCard { hand_index, targets, x } => {
                assert_eq!(hand_index, 2);
                assert_eq!(targets.len(), 1);
                assert_eq!(x, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(Intent::activate(0, 1).verb(), "activate-ability");
    }

    #[test]
    fn test_intent_serialization() {
        let intent = Intent::DeclareBlockers { blocks: vec![(0, 1), (1, 1)] };
        let json = serde_json::to_string(&intent).unwrap();
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, back);
    }
}
