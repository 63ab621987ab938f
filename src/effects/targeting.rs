//! Effect targeting system.
//!
//! - `Target`: One chosen target (player, permanent, graveyard card, spell)
//! - `TargetRequirement`: What kind of target, how many, and a filter
//! - `TargetFilter`: Closed predicate over permanents, cards and players
//! - `TargetValidator`: Legality at cast time and again at resolution
//!
//! The same predicate runs at both times. A target that was legal when the
//! spell was cast can stop being legal (it left play, gained shroud or
//! protection, stopped attacking); at resolution that is the fizzle check.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::effect::{Effect, TypeList};
use crate::cards::{Card, CardType, Color, ColorSet, Keyword, Permanent, Subtype};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::stack::StackEntry;
use crate::statics::StaticQuery;

/// A chosen target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Permanent(EntityId),
    /// A card in any graveyard, by card id.
    GraveyardCard(EntityId),
    /// A spell on the stack, by stack entry id.
    Spell(EntityId),
}

impl Target {
    #[must_use]
    pub fn as_permanent(self) -> Option<EntityId> {
        match self {
            Target::Permanent(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_player(self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{p}"),
            Target::Permanent(id) => write!(f, "permanent {id}"),
            Target::GraveyardCard(id) => write!(f, "graveyard card {id}"),
            Target::Spell(id) => write!(f, "spell {id}"),
        }
    }
}

/// What may be targeted, and how many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A creature, planeswalker or player.
    AnyTarget,
    Creature,
    Permanent,
    Player,
    Spell,
    GraveyardCard,
    Creatures { min: usize, max: usize },
    AnyTargets { min: usize, max: usize },
    GraveyardCards { min: usize, max: usize },
}

impl TargetKind {
    /// Allowed number of targets.
    #[must_use]
    pub const fn bounds(self) -> (usize, usize) {
        match self {
            TargetKind::Creatures { min, max }
            | TargetKind::AnyTargets { min, max }
            | TargetKind::GraveyardCards { min, max } => (min, max),
            _ => (1, 1),
        }
    }

    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(
            self,
            TargetKind::Creatures { .. } | TargetKind::AnyTargets { .. } | TargetKind::GraveyardCards { .. }
        )
    }

    fn accepts(self, target: Target) -> bool {
        match self {
            TargetKind::AnyTarget | TargetKind::AnyTargets { .. } => {
                matches!(target, Target::Player(_) | Target::Permanent(_))
            }
            TargetKind::Creature | TargetKind::Creatures { .. } | TargetKind::Permanent => {
                matches!(target, Target::Permanent(_))
            }
            TargetKind::Player => matches!(target, Target::Player(_)),
            TargetKind::Spell => matches!(target, Target::Spell(_)),
            TargetKind::GraveyardCard | TargetKind::GraveyardCards { .. } => {
                matches!(target, Target::GraveyardCard(_))
            }
        }
    }
}

/// Relation between the targeting player and a target's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRelation {
    You,
    Opponent,
}

impl PlayerRelation {
    #[must_use]
    pub fn holds(self, you: PlayerId, other: PlayerId) -> bool {
        match self {
            PlayerRelation::You => you == other,
            PlayerRelation::Opponent => you != other,
        }
    }
}

/// Structural target predicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    ColorIn(ColorSet),
    TypeIn(TypeList),
    SubtypeIs(Subtype),
    Tapped,
    Untapped,
    Attacking,
    Blocking,
    AttackingOrBlocking,
    /// Effective power at most N.
    MaxPower(i32),
    /// Controller (or owner, for cards off the battlefield).
    Controller(PlayerRelation),
    AnyOf(Vec<TargetFilter>),
    AllOf(Vec<TargetFilter>),
    Not(Box<TargetFilter>),
}

impl TargetFilter {
    #[must_use]
    pub fn not(filter: TargetFilter) -> Self {
        TargetFilter::Not(Box::new(filter))
    }

    #[must_use]
    pub fn types(types: &[CardType]) -> Self {
        TargetFilter::TypeIn(SmallVec::from_slice(types))
    }

    /// Evaluate against a permanent.
    #[must_use]
    pub fn matches_permanent(&self, state: &GameState, perm: &Permanent, you: PlayerId) -> bool {
        match self {
            TargetFilter::ColorIn(colors) => colors.contains_opt(perm.definition().color),
            TargetFilter::TypeIn(types) => types.iter().any(|t| match t {
                CardType::Creature => StaticQuery::is_creature(state, perm),
                other => perm.definition().has_type(*other),
            }),
            TargetFilter::SubtypeIs(subtype) => perm.definition().has_subtype(*subtype),
            TargetFilter::Tapped => perm.tapped,
            TargetFilter::Untapped => !perm.tapped,
            TargetFilter::Attacking => perm.attacking,
            TargetFilter::Blocking => perm.blocking,
            TargetFilter::AttackingOrBlocking => perm.in_combat(),
            TargetFilter::MaxPower(max) => StaticQuery::power(state, perm) <= *max,
            TargetFilter::Controller(relation) => relation.holds(you, perm.controller),
            TargetFilter::AnyOf(filters) => filters.iter().any(|f| f.matches_permanent(state, perm, you)),
            TargetFilter::AllOf(filters) => filters.iter().all(|f| f.matches_permanent(state, perm, you)),
            TargetFilter::Not(inner) => !inner.matches_permanent(state, perm, you),
        }
    }

    /// Evaluate against a card off the battlefield. `holder` is its owner
    /// (graveyard) or controller (stack).
    #[must_use]
    pub fn matches_card(&self, card: &Card, holder: PlayerId, you: PlayerId) -> bool {
        let def = &card.definition;
        match self {
            TargetFilter::ColorIn(colors) => colors.contains_opt(def.color),
            TargetFilter::TypeIn(types) => types.iter().any(|t| def.has_type(*t)),
            TargetFilter::SubtypeIs(subtype) => def.has_subtype(*subtype),
            TargetFilter::MaxPower(max) => def.power.map_or(false, |p| p <= *max),
            TargetFilter::Controller(relation) => relation.holds(you, holder),
            TargetFilter::Tapped
            | TargetFilter::Untapped
            | TargetFilter::Attacking
            | TargetFilter::Blocking
            | TargetFilter::AttackingOrBlocking => false,
            TargetFilter::AnyOf(filters) => filters.iter().any(|f| f.matches_card(card, holder, you)),
            TargetFilter::AllOf(filters) => filters.iter().all(|f| f.matches_card(card, holder, you)),
            TargetFilter::Not(inner) => !inner.matches_card(card, holder, you),
        }
    }

    /// Evaluate against a player. Only player relations can match.
    #[must_use]
    pub fn matches_player(&self, player: PlayerId, you: PlayerId) -> bool {
        match self {
            TargetFilter::Controller(relation) => relation.holds(you, player),
            TargetFilter::AnyOf(filters) => filters.iter().any(|f| f.matches_player(player, you)),
            TargetFilter::AllOf(filters) => filters.iter().all(|f| f.matches_player(player, you)),
            TargetFilter::Not(inner) => !inner.matches_player(player, you),
            _ => false,
        }
    }
}

/// A target kind plus an optional filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequirement {
    pub kind: TargetKind,
    pub filter: Option<TargetFilter>,
}

impl TargetRequirement {
    #[must_use]
    pub const fn new(kind: TargetKind) -> Self {
        Self { kind, filter: None }
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::new(TargetKind::AnyTarget)
    }

    #[must_use]
    pub const fn creature() -> Self {
        Self::new(TargetKind::Creature)
    }

    #[must_use]
    pub const fn permanent() -> Self {
        Self::new(TargetKind::Permanent)
    }

    #[must_use]
    pub const fn player() -> Self {
        Self::new(TargetKind::Player)
    }

    #[must_use]
    pub const fn spell() -> Self {
        Self::new(TargetKind::Spell)
    }

    #[must_use]
    pub const fn graveyard_card() -> Self {
        Self::new(TargetKind::GraveyardCard)
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The requirement implied by the first targeted effect in a list.
    #[must_use]
    pub fn implied_by(effects: &[Effect]) -> Option<Self> {
        effects.iter().find_map(Self::implied_by_effect)
    }

    fn implied_by_effect(effect: &Effect) -> Option<Self> {
        use Effect::*;
        let requirement = match effect {
            DealDamageToAnyTarget { .. }
            | DealDamageToAnyTargetAndGainLife { .. }
            | PreventDamageToTarget { .. } => Self::any(),
            DealOrderedDamageToTargets { amounts } => Self::new(TargetKind::AnyTargets {
                min: 1,
                max: amounts.len().max(1),
            }),
            DealDamageToTargetCreature { .. }
            | GainLifeEqualToTargetToughness
            | BoostTargetCreature { .. }
            | GrantKeywordToTarget { .. }
            | MakeTargetUnblockable
            | TargetCreatureCantBlockThisTurn
            | RegenerateTarget
            | BecomeCopyOfTargetCreature
            | SacrificeTargetAtEndOfCombat
            | GainControlOfTargetUntilEndOfTurn => Self::creature(),
            Equip => Self::creature()
                .with_filter(TargetFilter::Controller(PlayerRelation::You)),
            DealDamageToTargetPlayer { .. }
            | TargetPlayerLosesLife { .. }
            | DrainTargetPlayer { .. }
            | DoubleTargetPlayerLife
            | TargetPlayerLosesGame
            | TargetPlayerDraws { .. }
            | MillTargetPlayer { .. }
            | ChooseCardFromTargetHandToDiscard
            | TargetPlayerSacrificesCreature => Self::player(),
            TapTargetPermanent
            | UntapTargetPermanent
            | DestroyTargetPermanent { .. }
            | ExileTargetPermanent
            | ReturnTargetPermanentToHand
            | PutTargetOnBottomOfLibrary => Self::permanent(),
            ReturnTargetCardFromGraveyardToHand => Self::graveyard_card(),
            ExileTargetGraveyardCards => Self::new(TargetKind::GraveyardCards { min: 1, max: 2 }),
            CounterTargetSpell | CopyTargetSpell => Self::spell(),
            May(inner) => return Self::implied_by_effect(inner),
            _ => return None,
        };
        Some(requirement)
    }
}

/// Who is targeting, and with what.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetContext {
    pub controller: PlayerId,
    pub source_color: Option<Color>,
    /// The permanent the ability comes from, if any.
    pub source: Option<EntityId>,
}

impl TargetContext {
    #[must_use]
    pub fn new(controller: PlayerId, source_color: Option<Color>) -> Self {
        Self {
            controller,
            source_color,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<EntityId>) -> Self {
        self.source = source;
        self
    }
}

/// Target legality checks.
pub struct TargetValidator;

impl TargetValidator {
    /// Whether one target is legal for a requirement right now.
    #[must_use]
    pub fn is_legal(state: &GameState, req: &TargetRequirement, target: Target, ctx: &TargetContext) -> bool {
        if !req.kind.accepts(target) {
            return false;
        }
        let you = ctx.controller;
        match target {
            Target::Player(player) => {
                !StaticQuery::player_has_shroud(state, player)
                    && req.filter.as_ref().map_or(true, |f| f.matches_player(player, you))
            }
            Target::Permanent(id) => {
                let Some(perm) = state.permanent(id) else {
                    return false;
                };
                let kind_ok = match req.kind {
                    TargetKind::Creature | TargetKind::Creatures { .. } => StaticQuery::is_creature(state, perm),
                    TargetKind::AnyTarget | TargetKind::AnyTargets { .. } => {
                        StaticQuery::is_creature(state, perm)
                            || perm.definition().has_type(CardType::Planeswalker)
                    }
                    _ => true,
                };
                kind_ok
                    && !StaticQuery::has_keyword(state, perm, Keyword::Shroud)
                    && !StaticQuery::protection(state, perm).contains_opt(ctx.source_color)
                    && req.filter.as_ref().map_or(true, |f| f.matches_permanent(state, perm, you))
            }
            Target::GraveyardCard(id) => state.graveyard_card(id).map_or(false, |card| {
                req.filter.as_ref().map_or(true, |f| f.matches_card(card, card.owner, you))
            }),
            Target::Spell(id) => state.stack_entry(id).map_or(false, |entry| {
                entry.kind.is_spell()
                    && req.filter.as_ref().map_or(true, |f| f.matches_card(&entry.card, entry.controller, you))
            }),
        }
    }

    /// Cast/activation-time check of a full target selection.
    pub fn validate_choice(
        state: &GameState,
        req: &TargetRequirement,
        targets: &[Target],
        ctx: &TargetContext,
    ) -> Result<()> {
        let (min, max) = req.kind.bounds();
        if targets.len() < min || targets.len() > max {
            return Err(EngineError::illegal_target(format!(
                "expected {} target(s), got {}",
                if min == max { min.to_string() } else { format!("{min}-{max}") },
                targets.len()
            )));
        }
        for (i, target) in targets.iter().enumerate() {
            if targets[..i].contains(target) {
                return Err(EngineError::illegal_target(format!("{target} chosen twice")));
            }
            if !Self::is_legal(state, req, *target, ctx) {
                return Err(EngineError::illegal_target(format!(
                    "{} is not a legal target",
                    state.describe_target(*target)
                )));
            }
        }
        Ok(())
    }

    /// Every currently legal target for a requirement.
    #[must_use]
    pub fn legal_targets(state: &GameState, req: &TargetRequirement, ctx: &TargetContext) -> Vec<Target> {
        let players = PlayerId::both().map(Target::Player);
        let permanents = state.all_permanents().map(|p| Target::Permanent(p.id));
        let graveyard = state
            .players
            .values()
            .flat_map(|board| board.graveyard.iter().map(|c| Target::GraveyardCard(c.id)));
        let spells = state.stack.iter().rev().map(|e| Target::Spell(e.id));

        players
            .chain(permanents)
            .chain(graveyard)
            .chain(spells)
            .filter(|t| Self::is_legal(state, req, *t, ctx))
            .collect()
    }

    /// Resolution-time fizzle decision for a stack entry.
    ///
    /// Untargeted entries never fizzle. A single-target entry fizzles when
    /// its target is illegal; a multi-target entry only when all are.
    #[must_use]
    pub fn fizzles(state: &GameState, entry: &StackEntry) -> bool {
        let Some(req) = &entry.requirement else {
            return false;
        };
        if entry.targets.is_empty() {
            return false;
        }
        let ctx = entry.target_context();
        if req.kind.is_multi() {
            entry.targets.iter().all(|t| !Self::is_legal(state, req, *t, &ctx))
        } else {
            !Self::is_legal(state, req, entry.targets[0], &ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bounds() {
        assert_eq!(TargetKind::Creature.bounds(), (1, 1));
        assert_eq!(TargetKind::Creatures { min: 1, max: 3 }.bounds(), (1, 3));
        assert!(TargetKind::AnyTargets { min: 2, max: 2 }.is_multi());
        assert!(!TargetKind::Spell.is_multi());
    }

    #[test]
    fn test_kind_accepts() {
        let p = Target::Player(PlayerId::new(0));
        let c = Target::Permanent(EntityId(9));
        assert!(TargetKind::AnyTarget.accepts(p));
        assert!(TargetKind::AnyTarget.accepts(c));
        assert!(!TargetKind::Creature.accepts(p));
        assert!(!TargetKind::Player.accepts(c));
        assert!(!TargetKind::Spell.accepts(Target::GraveyardCard(EntityId(9))));
    }

    #[test]
    fn test_player_filter() {
        let you = PlayerId::new(0);
        let opp = PlayerId::new(1);
        let filter = TargetFilter::Controller(PlayerRelation::Opponent);
        assert!(filter.matches_player(opp, you));
        assert!(!filter.matches_player(you, you));
        assert!(TargetFilter::not(filter).matches_player(you, you));
        assert!(!TargetFilter::Tapped.matches_player(opp, you));
    }

    #[test]
    fn test_implied_requirements() {
        assert_eq!(
            TargetRequirement::implied_by(&[Effect::gain_life(2), Effect::damage(2)]),
            Some(TargetRequirement::any())
        );
        assert_eq!(
            TargetRequirement::implied_by(&[Effect::may(Effect::CounterTargetSpell)]),
            Some(TargetRequirement::spell())
        );
        assert_eq!(TargetRequirement::implied_by(&[Effect::draw(1)]), None);
    }
}
