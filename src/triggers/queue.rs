//! Trigger collection and queueing.
//!
//! Firing an event only records the abilities it triggers. They are put on
//! the stack by [`Triggers::flush`] the next time the engine settles, in
//! APNAP order: the active player's triggers go on the stack first, so the
//! non-active player's resolve first.
//!
//! Two kinds of trigger need a decision before they can go on the stack:
//!
//! - A lone "may" ability waits in the may queue for a yes/no answer.
//! - A targeted ability waits in the targeted queue for its controller to
//!   pick a target. With no legal target it is removed.
//!
//! Each decision is one `PendingInput`; [`Triggers::prompt_next`] raises
//! them one at a time.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::event::GameEvent;
use crate::cards::{Card, EffectSlot, Permanent};
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{Effect, Target, TargetContext, TargetRequirement, TargetValidator};
use crate::interaction::{ChoicePurpose, PendingInput};
use crate::stack::{StackEntry, StackEntryKind};

/// A triggered ability that has not reached the stack yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub controller: PlayerId,
    /// `None` once the source left play (death triggers).
    pub source: Option<EntityId>,
    pub card: Card,
    pub slot: EffectSlot,
    pub effects: Vec<Effect>,
}

impl PendingTrigger {
    fn from_permanent(perm: &Permanent, slot: EffectSlot) -> Option<Self> {
        let effects = perm.definition().effects_for(slot);
        (!effects.is_empty()).then(|| Self {
            controller: perm.controller,
            source: Some(perm.id),
            card: perm.card.clone(),
            slot,
            effects: effects.to_vec(),
        })
    }

    #[must_use]
    pub fn requirement(&self) -> Option<TargetRequirement> {
        TargetRequirement::implied_by(&self.effects)
    }

    #[must_use]
    pub fn target_context(&self) -> TargetContext {
        TargetContext::new(self.controller, self.card.definition.color).with_source(self.source)
    }

    #[must_use]
    pub fn description(&self) -> String {
        format!("{} trigger", self.card.name())
    }
}

/// Triggers between firing and the stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerQueue {
    /// Fired since the last flush.
    pub pending: Vec<PendingTrigger>,
    /// Optional abilities waiting for a yes/no answer.
    pub may: VecDeque<PendingTrigger>,
    /// Abilities waiting for a target choice.
    pub targeted: VecDeque<PendingTrigger>,
}

impl TriggerQueue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.may.is_empty() && self.targeted.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.may.len() + self.targeted.len()
    }
}

/// Trigger handling on a `GameState`.
pub struct Triggers;

impl Triggers {
    /// Record every ability an event triggers.
    pub fn fire(state: &mut GameState, event: GameEvent) {
        let slot = event.slot();
        let fired: Vec<PendingTrigger> = match &event {
            GameEvent::EnteredBattlefield(id)
            | GameEvent::Attacked(id)
            | GameEvent::Blocked(id)
            | GameEvent::CombatDamageToPlayer { source: id } => state
                .permanent(*id)
                .and_then(|perm| PendingTrigger::from_permanent(perm, slot))
                .into_iter()
                .collect(),
            GameEvent::Died { card, controller } => {
                let effects = card.definition.effects_for(slot);
                if effects.is_empty() {
                    Vec::new()
                } else {
                    vec![PendingTrigger {
                        controller: *controller,
                        source: None,
                        card: card.clone(),
                        slot,
                        effects: effects.to_vec(),
                    }]
                }
            }
            GameEvent::Upkeep(player) | GameEvent::DrawStep(player) => state.players[*player]
                .battlefield
                .iter()
                .filter_map(|perm| PendingTrigger::from_permanent(perm, slot))
                .collect(),
            GameEvent::EndStep => PlayerId::starting_with(state.active_player)
                .into_iter()
                .flat_map(|p| state.players[p].battlefield.iter())
                .filter_map(|perm| PendingTrigger::from_permanent(perm, slot))
                .collect(),
        };
        if !fired.is_empty() {
            debug!(?slot, count = fired.len(), "abilities triggered");
            state.triggers.pending.extend(fired);
        }
    }

    /// Move fired triggers onward: onto the stack, or into a decision queue.
    pub fn flush(state: &mut GameState) {
        if state.triggers.pending.is_empty() {
            return;
        }
        let mut fired = std::mem::take(&mut state.triggers.pending);
        let active = state.active_player;
        // Stable: firing order is kept within each player.
        fired.sort_by_key(|t| t.controller != active);

        for trigger in fired {
            let optional = match trigger.effects.as_slice() {
                [Effect::May(inner)] => Some((**inner).clone()),
                _ => None,
            };
            if let Some(inner) = optional {
                state.triggers.may.push_back(PendingTrigger {
                    effects: vec![inner],
                    ..trigger
                });
            } else if trigger.requirement().is_some() {
                state.triggers.targeted.push_back(trigger);
            } else {
                Self::push_to_stack(state, trigger, SmallVec::new());
            }
        }
    }

    /// Raise the next trigger decision, if any. Returns true when a prompt
    /// was set.
    pub fn prompt_next(state: &mut GameState) -> bool {
        if state.pending.is_some() {
            return false;
        }
        while let Some(trigger) = state.triggers.targeted.pop_front() {
            if Self::prompt_target(state, trigger) {
                return true;
            }
        }
        if let Some(trigger) = state.triggers.may.pop_front() {
            state.pending = Some(PendingInput::MayTrigger {
                player: trigger.controller,
                trigger: Box::new(trigger),
            });
            return true;
        }
        false
    }

    /// An accepted "may" ability continues like any other trigger.
    pub fn accept(state: &mut GameState, trigger: PendingTrigger) {
        state.log_event(format!("{} chooses to use {}.", trigger.controller, trigger.description()));
        Self::prompt_target(state, trigger);
    }

    /// Ask for a trigger's target. Untargeted triggers go straight on the
    /// stack; triggers with nothing legal to target are removed.
    fn prompt_target(state: &mut GameState, trigger: PendingTrigger) -> bool {
        let Some(requirement) = trigger.requirement() else {
            Self::push_to_stack(state, trigger, SmallVec::new());
            return false;
        };
        let options = TargetValidator::legal_targets(state, &requirement, &trigger.target_context());
        if options.is_empty() {
            state.log_event(format!("{} has no legal targets.", trigger.description()));
            return false;
        }
        state.pending = Some(PendingInput::PermanentChoice {
            player: trigger.controller,
            purpose: ChoicePurpose::TriggerTarget(Box::new(trigger)),
            options,
            optional: false,
        });
        true
    }

    /// Put a trigger on the stack.
    pub fn push_to_stack(state: &mut GameState, trigger: PendingTrigger, targets: SmallVec<[Target; 3]>) {
        let id = state.alloc_id();
        let entry = StackEntry::ability(
            id,
            StackEntryKind::TriggeredAbility,
            trigger.card,
            trigger.source,
            trigger.controller,
            trigger.effects,
        )
        .with_targets(targets);
        state.log_event(format!("{} goes on the stack.", entry.description));
        state.stack.push(entry);
        state.priority.clear();
    }
}
