//! Answering prompts.
//!
//! Every answer is checked against the open prompt before anything moves.
//! The prompt is cleared before the game carries on, so whatever resumes
//! (a suspended resolution, the cleanup step) is free to raise the next one.

use smallvec::smallvec;
use tracing::debug;

use super::pending::{ChoicePurpose, ColorPurpose, DiscardReason, GraveyardPurpose, PendingInput};
use crate::cards::Color;
use crate::combat::Combat;
use crate::core::{EngineError, EntityId, GameState, Intent, PlayerId, Result};
use crate::effects::{EffectResolver, Target};
use crate::rules::TurnSequencer;
use crate::triggers::Triggers;
use crate::zones::{Zone, ZonePosition};

/// Applies answers to pending prompts.
pub struct Answers;

impl Answers {
    /// Answer the open prompt. Fails with `WrongPrompt` unless `player` is
    /// the one asked and `intent` is the verb the prompt expects.
    pub fn answer(state: &mut GameState, player: PlayerId, intent: &Intent) -> Result<()> {
        let pending = state.pending.clone().ok_or(EngineError::WrongPrompt)?;
        if pending.player() != player || !pending.accepts(intent) {
            return Err(EngineError::WrongPrompt);
        }
        debug!(%player, verb = intent.verb(), "answering prompt");

        match (pending, intent) {
            (PendingInput::DeclareAttackers { .. }, Intent::DeclareAttackers { attackers }) => {
                Combat::declare_attackers(state, player, attackers)?;
                state.pending = None;
                Ok(())
            }
            (PendingInput::DeclareBlockers { .. }, Intent::DeclareBlockers { blocks }) => {
                Combat::declare_blockers(state, player, blocks)?;
                state.pending = None;
                Ok(())
            }
            (PendingInput::ColorChoice { purpose, .. }, Intent::ChooseColor { color }) => {
                Self::choose_color(state, player, purpose, *color)
            }
            (
                PendingInput::PermanentChoice { purpose, options, optional, .. },
                Intent::ChoosePermanent { choice },
            ) => {
                let chosen = match choice {
                    Some(index) => Some(*options.get(*index).ok_or(EngineError::InvalidIndex {
                        what: "choice",
                        index: *index,
                    })?),
                    None if optional => None,
                    None => return Err(EngineError::rejected("a choice is required")),
                };
                Self::choose_permanent(state, player, purpose, &options, chosen)
            }
            (PendingInput::Discard { remaining, reason, .. }, Intent::ChooseHandCard { index }) => {
                Self::discard(state, player, remaining, reason, *index)
            }
            (
                PendingInput::RevealedHandChoice { target_player, options, .. },
                Intent::ChooseHandCard { index },
            ) => {
                if !options.iter().any(|(i, _)| i == index) {
                    return Err(EngineError::InvalidIndex { what: "revealed hand", index: *index });
                }
                state.discard(target_player, *index)?;
                state.pending = None;
                EffectResolver::resume(state)
            }
            (PendingInput::GraveyardChoice { purpose, options, .. }, Intent::ChooseGraveyardCard { choice }) => {
                let chosen = Self::pick(&options, *choice, "graveyard")?;
                Self::return_from_graveyard(state, player, purpose, chosen)
            }
            (PendingInput::MayTrigger { trigger, .. }, Intent::AnswerMay { accept }) => {
                state.pending = None;
                if *accept {
                    Triggers::accept(state, *trigger);
                } else {
                    state.log_event(format!("{player} declines {}.", trigger.description()));
                }
                Ok(())
            }
            (PendingInput::MayEffect { effect, .. }, Intent::AnswerMay { accept }) => {
                state.pending = None;
                if *accept {
                    EffectResolver::resume_with(state, *effect)
                } else {
                    EffectResolver::resume(state)
                }
            }
            (PendingInput::LibraryReorder { count, .. }, Intent::ReorderLibrary { order }) => {
                if order.len() != count {
                    return Err(EngineError::rejected(format!("order must list exactly {count} cards")));
                }
                state.players[player].library.reorder_top(order)?;
                state.log_event(format!("{player} puts the top {count} cards back in a chosen order."));
                state.pending = None;
                EffectResolver::resume(state)
            }
            (PendingInput::LibrarySearch { options, .. }, Intent::ChooseLibraryCard { choice }) => {
                let chosen = Self::pick(&options, *choice, "library")?;
                Self::finish_search(state, player, chosen)
            }
            (_, intent) => Err(EngineError::invariant(format!(
                "prompt accepted {} but has no answer handler",
                intent.verb()
            ))),
        }
    }

    /// An optional choice among listed ids.
    fn pick(options: &[EntityId], choice: Option<usize>, what: &'static str) -> Result<Option<EntityId>> {
        choice
            .map(|index| options.get(index).copied().ok_or(EngineError::InvalidIndex { what, index }))
            .transpose()
    }

    fn choose_color(state: &mut GameState, player: PlayerId, purpose: ColorPurpose, color: Color) -> Result<()> {
        match purpose {
            ColorPurpose::PreventDamage => {
                state.prevention.colors.insert(color);
                state.log_event(format!(
                    "{player} chooses {color}. Damage from {color} sources is prevented this turn."
                ));
            }
            ColorPurpose::SourceColor(id) => {
                if let Some(perm) = state.permanent_mut(id) {
                    perm.chosen_color = Some(color);
                    let name = perm.name().to_string();
                    state.log_event(format!("{player} chooses {color} for {name}."));
                }
            }
        }
        state.pending = None;
        EffectResolver::resume(state)
    }

    fn choose_permanent(
        state: &mut GameState,
        player: PlayerId,
        purpose: ChoicePurpose,
        options: &[Target],
        chosen: Option<Target>,
    ) -> Result<()> {
        state.pending = None;
        match purpose {
            ChoicePurpose::LegendRule => {
                let Some(Target::Permanent(keep)) = chosen else {
                    return Err(EngineError::invariant("legend rule choice is not a permanent"));
                };
                let name = state.require_permanent(keep)?.name().to_string();
                state.log_event(format!("{player} keeps {name}."));
                for id in options.iter().filter_map(|t| t.as_permanent()) {
                    if id != keep && state.permanent(id).is_some() {
                        state.dies(id)?;
                    }
                }
                Ok(())
            }
            ChoicePurpose::SacrificeCreature => {
                if let Some(id) = chosen.and_then(Target::as_permanent) {
                    state.sacrifice(id)?;
                }
                EffectResolver::resume(state)
            }
            ChoicePurpose::TriggerTarget(trigger) => {
                let Some(target) = chosen else {
                    return Err(EngineError::invariant("trigger target choice is empty"));
                };
                Triggers::push_to_stack(state, *trigger, smallvec![target]);
                Ok(())
            }
        }
    }

    fn discard(
        state: &mut GameState,
        player: PlayerId,
        remaining: usize,
        reason: DiscardReason,
        index: usize,
    ) -> Result<()> {
        state.discard(player, index)?;
        if remaining > 1 && !state.players[player].hand.is_empty() {
            state.pending = Some(PendingInput::Discard {
                player,
                remaining: remaining - 1,
                reason,
            });
            return Ok(());
        }
        state.pending = None;
        match reason {
            DiscardReason::Effect => EffectResolver::resume(state),
            DiscardReason::Cleanup => TurnSequencer::finish_cleanup(state),
        }
    }

    fn return_from_graveyard(
        state: &mut GameState,
        player: PlayerId,
        purpose: GraveyardPurpose,
        chosen: Option<EntityId>,
    ) -> Result<()> {
        state.pending = None;
        if let Some(card) = chosen.and_then(|id| state.take_graveyard_card(id)) {
            match purpose {
                GraveyardPurpose::ToBattlefield => {
                    state.put_onto_battlefield(card, player);
                }
                GraveyardPurpose::ToHand => {
                    state.log_event(format!("{} returns to {player}'s hand.", card.name()));
                    state.put_card(card, Zone::Hand, ZonePosition::Top)?;
                }
            }
        }
        EffectResolver::resume(state)
    }

    fn finish_search(state: &mut GameState, player: PlayerId, chosen: Option<EntityId>) -> Result<()> {
        state.pending = None;
        let board = &mut state.players[player];
        let found = chosen.and_then(|id| board.library.remove_id(id));
        if let Some(card) = &found {
            board.hand.push(card.clone());
        }
        board.library.shuffle(&mut state.rng);
        match found {
            Some(card) => state.log_event(format!("{player} puts {} into their hand.", card.name())),
            None => state.log_event(format!("{player} finds nothing.")),
        }
        EffectResolver::resume(state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, CardDefinition, Subtype};
    use crate::core::EngineConfig;

    fn in_hand(state: &mut GameState, player: PlayerId, name: &str) {
        let def = Arc::new(CardDefinition::sorcery(name, "{1}".parse().unwrap()));
        let card = Card::new(state.alloc_id(), player, def);
        state.players[player].hand.push(card);
    }

    #[test]
    fn test_wrong_player_cannot_answer() {
        let mut state = GameState::new(EngineConfig::default());
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        state.pending = Some(PendingInput::ColorChoice {
            player: p0,
            purpose: ColorPurpose::PreventDamage,
        });
        let err = Answers::answer(&mut state, p1, &Intent::ChooseColor { color: Color::Red }).unwrap_err();
        assert_eq!(err, EngineError::WrongPrompt);
        let err = Answers::answer(&mut state, p0, &Intent::AnswerMay { accept: true }).unwrap_err();
        assert_eq!(err, EngineError::WrongPrompt);
        assert!(state.pending.is_some());
    }

    #[test]
    fn test_prevent_color() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        state.pending = Some(PendingInput::ColorChoice {
            player: p0,
            purpose: ColorPurpose::PreventDamage,
        });
        Answers::answer(&mut state, p0, &Intent::ChooseColor { color: Color::Red }).unwrap();
        assert!(state.prevention.colors.contains_opt(Some(Color::Red)));
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_discard_counts_down() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        for name in ["A", "B", "C"] {
            in_hand(&mut state, p0, name);
        }
        state.pending = Some(PendingInput::Discard {
            player: p0,
            remaining: 2,
            reason: DiscardReason::Effect,
        });

        Answers::answer(&mut state, p0, &Intent::ChooseHandCard { index: 1 }).unwrap();
        assert!(matches!(state.pending, Some(PendingInput::Discard { remaining: 1, .. })));

        let err = Answers::answer(&mut state, p0, &Intent::ChooseHandCard { index: 5 }).unwrap_err();
        assert_eq!(err, EngineError::InvalidIndex { what: "hand", index: 5 });

        Answers::answer(&mut state, p0, &Intent::ChooseHandCard { index: 0 }).unwrap();
        assert!(state.pending.is_none());
        assert_eq!(state.players[p0].hand.len(), 1);
        assert_eq!(state.players[p0].graveyard.len(), 2);
    }

    #[test]
    fn test_legend_rule_keeps_choice() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let def = Arc::new(
            CardDefinition::creature("Tolsimir", "{1}{G}{W}".parse().unwrap(), 3, 3).legendary(),
        );
        let a = Card::new(state.alloc_id(), p0, def.clone());
        let b = Card::new(state.alloc_id(), p0, def);
        let first = state.put_onto_battlefield(a, p0);
        let second = state.put_onto_battlefield(b, p0);
        state.pending = Some(PendingInput::PermanentChoice {
            player: p0,
            purpose: ChoicePurpose::LegendRule,
            options: vec![Target::Permanent(first), Target::Permanent(second)],
            optional: false,
        });

        let err = Answers::answer(&mut state, p0, &Intent::ChoosePermanent { choice: None }).unwrap_err();
        assert!(err.is_illegal_action());

        Answers::answer(&mut state, p0, &Intent::ChoosePermanent { choice: Some(1) }).unwrap();
        assert!(state.permanent(first).is_none());
        assert!(state.permanent(second).is_some());
        assert_eq!(state.players[p0].graveyard.len(), 1);
    }

    #[test]
    fn test_library_search() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let forest = Card::new(state.alloc_id(), p0, Arc::new(CardDefinition::basic_land(Subtype::Forest)));
        let id = forest.id;
        state.players[p0].library.push(forest);
        state.pending = Some(PendingInput::LibrarySearch { player: p0, options: vec![id] });

        Answers::answer(&mut state, p0, &Intent::ChooseLibraryCard { choice: Some(0) }).unwrap();
        assert!(state.players[p0].library.is_empty());
        assert_eq!(state.players[p0].hand.get(0).map(|c| c.id), Some(id));
    }
}
