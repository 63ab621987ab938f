//! Stack entries.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, CardDefinition, CardType, EffectSlot};
use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, Target, TargetContext, TargetRequirement};

/// What an entry on the stack is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackEntryKind {
    CreatureSpell,
    InstantSpell,
    SorcerySpell,
    EnchantmentSpell,
    ArtifactSpell,
    PlaneswalkerSpell,
    TriggeredAbility,
    ActivatedAbility,
}

impl StackEntryKind {
    /// Spells can be countered and copied; abilities cannot.
    #[must_use]
    pub const fn is_spell(self) -> bool {
        !matches!(self, StackEntryKind::TriggeredAbility | StackEntryKind::ActivatedAbility)
    }

    /// Spells that become permanents when they resolve.
    #[must_use]
    pub const fn is_permanent_spell(self) -> bool {
        matches!(
            self,
            StackEntryKind::CreatureSpell
                | StackEntryKind::EnchantmentSpell
                | StackEntryKind::ArtifactSpell
                | StackEntryKind::PlaneswalkerSpell
        )
    }

    /// Spell kind for a card. Artifact creatures are creature spells.
    #[must_use]
    pub fn for_card(def: &CardDefinition) -> Self {
        if def.has_type(CardType::Creature) {
            StackEntryKind::CreatureSpell
        } else if def.has_type(CardType::Planeswalker) {
            StackEntryKind::PlaneswalkerSpell
        } else if def.has_type(CardType::Artifact) {
            StackEntryKind::ArtifactSpell
        } else if def.has_type(CardType::Enchantment) {
            StackEntryKind::EnchantmentSpell
        } else if def.has_type(CardType::Instant) {
            StackEntryKind::InstantSpell
        } else {
            StackEntryKind::SorcerySpell
        }
    }
}

/// A spell or ability waiting to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: EntityId,
    pub kind: StackEntryKind,

    /// The spell card, or the card the ability comes from.
    pub card: Card,

    /// The permanent an ability comes from, if it is still known.
    pub source: Option<EntityId>,

    pub controller: PlayerId,
    pub description: String,
    pub effects: Vec<Effect>,
    pub x: i32,

    /// Chosen targets in order. Empty for untargeted entries.
    pub targets: SmallVec<[Target; 3]>,

    /// Re-checked at resolution. `None` means the entry never fizzles.
    pub requirement: Option<TargetRequirement>,

    /// Copies cease to exist once they resolve.
    pub is_copy: bool,
}

impl StackEntry {
    /// A spell cast from hand.
    #[must_use]
    pub fn spell(id: EntityId, card: Card, controller: PlayerId) -> Self {
        let def = &card.definition;
        Self {
            id,
            kind: StackEntryKind::for_card(def),
            description: def.name.clone(),
            effects: def.effects_for(EffectSlot::Spell).to_vec(),
            requirement: def.target_requirement(),
            source: None,
            controller,
            x: 0,
            targets: SmallVec::new(),
            is_copy: false,
            card,
        }
    }

    /// A triggered or activated ability.
    #[must_use]
    pub fn ability(
        id: EntityId,
        kind: StackEntryKind,
        card: Card,
        source: Option<EntityId>,
        controller: PlayerId,
        effects: Vec<Effect>,
    ) -> Self {
        let verb = if kind == StackEntryKind::TriggeredAbility { "trigger" } else { "ability" };
        Self {
            id,
            kind,
            description: format!("{} {verb}", card.name()),
            requirement: TargetRequirement::implied_by(&effects),
            effects,
            source,
            controller,
            x: 0,
            targets: SmallVec::new(),
            is_copy: false,
            card,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: i32) -> Self {
        self.x = x;
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Option<TargetRequirement>) -> Self {
        self.requirement = requirement;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Who is targeting, for legality checks.
    #[must_use]
    pub fn target_context(&self) -> TargetContext {
        TargetContext::new(self.controller, self.card.definition.color).with_source(self.source)
    }

    #[must_use]
    pub fn is_targeted(&self) -> bool {
        self.requirement.is_some() && !self.targets.is_empty()
    }

    /// A copy controlled by `controller`, with a fresh id.
    #[must_use]
    pub fn copy_for(&self, id: EntityId, controller: PlayerId) -> Self {
        Self {
            id,
            controller,
            description: format!("copy of {}", self.description),
            is_copy: true,
            ..self.clone()
        }
    }
}
