//! The awaiting-input marker.
//!
//! At most one prompt is open per match. While it is set, only the answer
//! verb it expects, from the player it names, is accepted.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, Intent, PlayerId};
use crate::effects::{Effect, Target};
use crate::triggers::PendingTrigger;

/// Why a choice among targets is being asked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoicePurpose {
    /// Keep one of several legendary permanents with the same name.
    LegendRule,
    /// Sacrifice one of your creatures.
    SacrificeCreature,
    /// Pick the target of a triggered ability.
    TriggerTarget(Box<PendingTrigger>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorPurpose {
    /// Damage from sources of the color is prevented this turn.
    PreventDamage,
    /// The permanent gets the chosen color (protection and similar).
    SourceColor(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    Effect,
    /// Hand size limit during cleanup.
    Cleanup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraveyardPurpose {
    ToBattlefield,
    ToHand,
}

/// A question for one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingInput {
    DeclareAttackers { player: PlayerId },
    DeclareBlockers { player: PlayerId },
    ColorChoice { player: PlayerId, purpose: ColorPurpose },
    /// Choose one of `options`; `optional` allows choosing none.
    PermanentChoice {
        player: PlayerId,
        purpose: ChoicePurpose,
        options: Vec<Target>,
        optional: bool,
    },
    /// Discard `remaining` more cards from your own hand.
    Discard {
        player: PlayerId,
        remaining: usize,
        reason: DiscardReason,
    },
    /// Choose a card from `target_player`'s revealed hand. Options are
    /// (hand index, card name) pairs.
    RevealedHandChoice {
        player: PlayerId,
        target_player: PlayerId,
        options: Vec<(usize, String)>,
    },
    /// Optionally choose one of the listed cards in your graveyard.
    GraveyardChoice {
        player: PlayerId,
        purpose: GraveyardPurpose,
        options: Vec<EntityId>,
    },
    MayTrigger { player: PlayerId, trigger: Box<PendingTrigger> },
    /// Optional effect in the middle of a resolution.
    MayEffect { player: PlayerId, effect: Box<Effect> },
    /// Put the top `count` library cards back in any order.
    LibraryReorder { player: PlayerId, count: usize },
    /// Optionally choose one of the listed library cards.
    LibrarySearch { player: PlayerId, options: Vec<EntityId> },
}

impl PendingInput {
    /// The player who must answer.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            PendingInput::DeclareAttackers { player }
            | PendingInput::DeclareBlockers { player }
            | PendingInput::ColorChoice { player, .. }
            | PendingInput::PermanentChoice { player, .. }
            | PendingInput::Discard { player, .. }
            | PendingInput::RevealedHandChoice { player, .. }
            | PendingInput::GraveyardChoice { player, .. }
            | PendingInput::MayTrigger { player, .. }
            | PendingInput::MayEffect { player, .. }
            | PendingInput::LibraryReorder { player, .. }
            | PendingInput::LibrarySearch { player, .. } => *player,
        }
    }

    /// Whether an intent is the kind of answer this prompt expects.
    #[must_use]
    pub fn accepts(&self, intent: &Intent) -> bool {
        matches!(
            (self, intent),
            (PendingInput::DeclareAttackers { .. }, Intent::DeclareAttackers { .. })
                | (PendingInput::DeclareBlockers { .. }, Intent::DeclareBlockers { .. })
                | (PendingInput::ColorChoice { .. }, Intent::ChooseColor { .. })
                | (PendingInput::PermanentChoice { .. }, Intent::ChoosePermanent { .. })
                | (PendingInput::Discard { .. }, Intent::ChooseHandCard { .. })
                | (PendingInput::RevealedHandChoice { .. }, Intent::ChooseHandCard { .. })
                | (PendingInput::GraveyardChoice { .. }, Intent::ChooseGraveyardCard { .. })
                | (PendingInput::MayTrigger { .. }, Intent::AnswerMay { .. })
                | (PendingInput::MayEffect { .. }, Intent::AnswerMay { .. })
                | (PendingInput::LibraryReorder { .. }, Intent::ReorderLibrary { .. })
                | (PendingInput::LibrarySearch { .. }, Intent::ChooseLibraryCard { .. })
        )
    }

    /// Short prompt text for clients.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            PendingInput::DeclareAttackers { .. } => "Declare attackers".to_string(),
            PendingInput::DeclareBlockers { .. } => "Declare blockers".to_string(),
            PendingInput::ColorChoice { purpose, .. } => match purpose {
                ColorPurpose::PreventDamage => "Choose a color to prevent damage from".to_string(),
                ColorPurpose::SourceColor(_) => "Choose a color".to_string(),
            },
            PendingInput::PermanentChoice { purpose, .. } => match purpose {
                ChoicePurpose::LegendRule => "Choose the legendary permanent to keep".to_string(),
                ChoicePurpose::SacrificeCreature => "Choose a creature to sacrifice".to_string(),
                ChoicePurpose::TriggerTarget(trigger) => {
                    format!("Choose a target for {}", trigger.description())
                }
            },
            PendingInput::Discard { remaining, .. } => format!("Discard {remaining} card(s)"),
            PendingInput::RevealedHandChoice { target_player, .. } => {
                format!("Choose a card from {target_player}'s hand to discard")
            }
            PendingInput::GraveyardChoice { purpose, .. } => match purpose {
                GraveyardPurpose::ToBattlefield => {
                    "You may return a creature card from your graveyard to the battlefield".to_string()
                }
                GraveyardPurpose::ToHand => "You may return a card from your graveyard to your hand".to_string(),
            },
            PendingInput::MayTrigger { trigger, .. } => format!("Use {}?", trigger.description()),
            PendingInput::MayEffect { .. } => "Apply the optional effect?".to_string(),
            PendingInput::LibraryReorder { count, .. } => format!("Reorder the top {count} cards of your library"),
            PendingInput::LibrarySearch { .. } => "Search your library for a basic land".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matching_verb_only() {
        let prompt = PendingInput::Discard {
            player: PlayerId::new(0),
            remaining: 1,
            reason: DiscardReason::Cleanup,
        };
        assert!(prompt.accepts(&Intent::ChooseHandCard { index: 0 }));
        assert!(!prompt.accepts(&Intent::PassPriority));
        assert!(!prompt.accepts(&Intent::AnswerMay { accept: true }));
        assert_eq!(prompt.player(), PlayerId::new(0));
        assert_eq!(prompt.describe(), "Discard 1 card(s)");
    }

    #[test]
    fn test_prompt_serialization() {
        let prompt = PendingInput::PermanentChoice {
            player: PlayerId::new(1),
            purpose: ChoicePurpose::LegendRule,
            options: vec![Target::Permanent(EntityId(7)), Target::Permanent(EntityId(9))],
            optional: false,
        };
        let json = serde_json::to_string(&prompt).unwrap();
        let back: PendingInput = serde_json::from_str(&json).unwrap();
        assert_eq!(prompt, back);
    }
}
