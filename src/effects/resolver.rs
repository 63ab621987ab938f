//! Effect resolution - executing effects on game state.
//!
//! `EffectResolver::run` applies a list of effects in order. Every effect
//! goes through one exhaustive `match`; the handlers live in
//! [`handlers`](super::handlers), grouped by what they touch.
//!
//! ## Suspension
//!
//! Some effects need a player's decision (a discard choice, a "may", a
//! color). The handler sets `GameState::pending` and returns
//! [`Flow::Suspend`]; the resolver stores the context and the effects not
//! yet applied as a [`SuspendedResolution`]. Answering the prompt applies
//! the decision and calls [`EffectResolver::resume`], which carries on
//! where the list stopped. Nothing waits on a call stack.

use std::collections::VecDeque;

use smallvec::SmallVec;
use tracing::debug;

use super::effect::Effect;
use super::handlers::{control, creatures, damage, graveyard, library, life, misc, prevention, removal, stack};
use super::targeting::{Target, TargetValidator};
use crate::cards::{Card, Color};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::rules::DamageSource;
use crate::stack::StackEntry;
use crate::zones::{Zone, ZonePosition};

/// Whether resolution can go on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A prompt was raised; stop until it is answered.
    Suspend,
}

/// Everything an effect needs to know about what is resolving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectContext {
    pub controller: PlayerId,
    /// The permanent the effects come from, if any.
    pub source: Option<EntityId>,
    /// The card the effects are printed on.
    pub card: Card,
    pub x: i32,
    /// Targets in chosen order; `None` where a target is no longer legal.
    pub targets: SmallVec<[Option<Target>; 3]>,
    /// The spell card to put away once resolution finishes.
    pub spell: Option<Card>,
    /// Put the spell into its owner's library instead of the graveyard.
    pub to_library: bool,
}

impl EffectContext {
    /// Context for effects applied without the stack (mana abilities).
    #[must_use]
    pub fn new(controller: PlayerId, card: Card, source: Option<EntityId>) -> Self {
        Self {
            controller,
            source,
            card,
            x: 0,
            targets: SmallVec::new(),
            spell: None,
            to_library: false,
        }
    }

    /// Context for a resolving stack entry. Each target is re-checked;
    /// illegal ones become `None` and their part of the effect is skipped.
    #[must_use]
    pub fn from_entry(state: &GameState, entry: &StackEntry) -> Self {
        let targets = match &entry.requirement {
            Some(req) => {
                let ctx = entry.target_context();
                entry
                    .targets
                    .iter()
                    .map(|t| TargetValidator::is_legal(state, req, *t, &ctx).then_some(*t))
                    .collect()
            }
            None => entry.targets.iter().copied().map(Some).collect(),
        };
        let spell = (entry.kind.is_spell() && !entry.is_copy).then(|| entry.card.clone());
        Self {
            controller: entry.controller,
            source: entry.source,
            card: entry.card.clone(),
            x: entry.x,
            targets,
            spell,
            to_library: false,
        }
    }

    /// The first target, if still legal.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        self.targets.first().copied().flatten()
    }

    #[must_use]
    pub fn target_permanent(&self) -> Option<EntityId> {
        self.target().and_then(Target::as_permanent)
    }

    #[must_use]
    pub fn target_player(&self) -> Option<PlayerId> {
        self.target().and_then(Target::as_player)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.card.name()
    }

    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.card.definition.color
    }

    /// The source permanent if it is still in play, else the card.
    #[must_use]
    pub fn damage_source(&self, state: &GameState) -> DamageSource {
        match self.source.and_then(|id| state.permanent(id)) {
            Some(perm) => DamageSource::from_permanent(state, perm),
            None => DamageSource::from_card(&self.card, self.controller),
        }
    }
}

/// A resolution stopped for player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuspendedResolution {
    pub ctx: EffectContext,
    pub remaining: VecDeque<Effect>,
}

/// Applies effects.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply effects in order, then put the spell card away.
    pub fn run(state: &mut GameState, ctx: EffectContext, effects: Vec<Effect>) -> Result<()> {
        Self::drive(state, ctx, effects.into())
    }

    /// Continue a suspended resolution after its prompt was answered.
    pub fn resume(state: &mut GameState) -> Result<()> {
        match state.suspended.take() {
            Some(suspended) => Self::drive(state, suspended.ctx, suspended.remaining),
            None => Ok(()),
        }
    }

    /// Continue a suspended resolution, applying `effect` first (an
    /// accepted "may").
    pub fn resume_with(state: &mut GameState, effect: Effect) -> Result<()> {
        let mut suspended = state
            .suspended
            .take()
            .ok_or_else(|| EngineError::invariant("no resolution to resume"))?;
        suspended.remaining.push_front(effect);
        Self::drive(state, suspended.ctx, suspended.remaining)
    }

    fn drive(state: &mut GameState, mut ctx: EffectContext, mut remaining: VecDeque<Effect>) -> Result<()> {
        while let Some(effect) = remaining.pop_front() {
            debug!(card = ctx.name(), ?effect, "resolving effect");
            if Self::resolve(state, &mut ctx, &effect)? == Flow::Suspend {
                state.suspended = Some(SuspendedResolution { ctx, remaining });
                return Ok(());
            }
        }
        Self::finish(state, ctx)
    }

    /// Put a resolved spell where it goes next.
    fn finish(state: &mut GameState, ctx: EffectContext) -> Result<()> {
        let Some(card) = ctx.spell else {
            return Ok(());
        };
        let owner = card.owner;
        if ctx.to_library {
            state.log_event(format!("{} is shuffled into {owner}'s library.", card.name()));
            state.put_card(card, Zone::Library, ZonePosition::Top)?;
            let board = &mut state.players[owner];
            board.library.shuffle(&mut state.rng);
        } else {
            state.put_card(card, Zone::Graveyard, ZonePosition::Top)?;
        }
        Ok(())
    }

    /// Apply one effect.
    pub fn resolve(state: &mut GameState, ctx: &mut EffectContext, effect: &Effect) -> Result<Flow> {
        use Effect::*;
        let x = ctx.x;
        match effect {
            // Damage
            DealDamageToAnyTarget { amount }
            | DealDamageToTargetCreature { amount }
            | DealDamageToTargetPlayer { amount } => damage::to_target(state, ctx, amount.value(x))?,
            DealOrderedDamageToTargets { amounts } => damage::ordered(state, ctx, amounts)?,
            DealDamageToAllCreatures { amount } => damage::to_creatures(state, ctx, amount.value(x), false)?,
            DealDamageToAllCreaturesAndPlayers { amount } => {
                damage::to_creatures(state, ctx, amount.value(x), false)?;
                damage::to_players(state, ctx, amount.value(x));
            }
            DealDamageToFlyingAndPlayers { amount } => {
                damage::to_creatures(state, ctx, amount.value(x), true)?;
                damage::to_players(state, ctx, amount.value(x));
            }
            DealDamageToController { amount } => damage::to_controller(state, ctx, amount.value(x)),
            DealDamageToAnyTargetAndGainLife { amount, life } => {
                damage::to_target(state, ctx, amount.value(x))?;
                state.gain_life(ctx.controller, *life);
            }

            // Life
            GainLife { amount } => state.gain_life(ctx.controller, amount.value(x)),
            LoseLife { amount } => state.lose_life(ctx.controller, amount.value(x)),
            TargetPlayerLosesLife { amount } => life::target_loses(state, ctx, amount.value(x)),
            DrainTargetPlayer { amount } => life::drain(state, ctx, amount.value(x)),
            GainLifePerGraveyardCard => life::per_graveyard_card(state, ctx),
            GainLifeEqualToTargetToughness => life::equal_to_target_toughness(state, ctx),
            DoubleTargetPlayerLife => life::double_target(state, ctx),
            TargetPlayerLosesGame => life::target_loses_game(state, ctx),

            // Creatures
            BoostSelf { power, toughness } => creatures::boost_self(state, ctx, *power, *toughness),
            BoostTargetCreature { power, toughness } => creatures::boost_target(state, ctx, *power, *toughness),
            BoostAllOwnCreatures { power, toughness } => creatures::boost_own(state, ctx, *power, *toughness),
            GrantKeywordToTarget { keyword } => creatures::grant_keyword(state, ctx.target_permanent(), *keyword),
            GrantKeywordToSelf { keyword } => creatures::grant_keyword(state, ctx.source, *keyword),
            MakeTargetUnblockable => creatures::make_unblockable(state, ctx),
            TargetCreatureCantBlockThisTurn => creatures::cant_block(state, ctx),
            TapTargetPermanent => creatures::set_tapped(state, ctx.target_permanent(), true),
            UntapTargetPermanent => creatures::set_tapped(state, ctx.target_permanent(), false),
            UntapSelf => creatures::set_tapped(state, ctx.source, false),
            PutPlusOneCountersOnSource { count } => creatures::add_counters(state, ctx, *count),
            AnimateSelf { power, toughness } => creatures::animate_self(state, ctx, *power, *toughness),
            RegenerateSource => creatures::regeneration_shield(state, ctx.source),
            RegenerateTarget => creatures::regeneration_shield(state, ctx.target_permanent()),
            Equip => creatures::equip(state, ctx),
            BecomeCopyOfTargetCreature => creatures::become_copy(state, ctx),

            // Removal
            DestroyTargetPermanent { no_regeneration } => removal::destroy_target(state, ctx, *no_regeneration)?,
            DestroyAllCreatures { no_regeneration } => removal::destroy_all_creatures(state, *no_regeneration)?,
            DestroyAllEnchantments => removal::destroy_all_enchantments(state)?,
            ExileTargetPermanent => removal::move_target(state, ctx, Zone::Exile, ZonePosition::Top)?,
            ReturnTargetPermanentToHand => removal::move_target(state, ctx, Zone::Hand, ZonePosition::Top)?,
            ReturnAllCreaturesToHand => removal::bounce_all_creatures(state)?,
            PutTargetOnBottomOfLibrary => removal::move_target(state, ctx, Zone::Library, ZonePosition::Bottom)?,
            ReturnSelfToHand => removal::return_self(state, ctx)?,
            SacrificeSelf => removal::sacrifice_self(state, ctx)?,
            TargetPlayerSacrificesCreature => return removal::target_player_sacrifices(state, ctx),
            SacrificeTargetAtEndOfCombat => removal::sacrifice_at_end_of_combat(state, ctx),
            DestroyBlockedCreatureAndSelf => removal::destroy_combatants_and_self(state, ctx)?,

            // Cards and libraries
            DrawCards { amount } => library::draw(state, ctx.controller, amount.value(x)),
            TargetPlayerDraws { amount } => {
                if let Some(player) = ctx.target_player() {
                    library::draw(state, player, amount.value(x));
                }
            }
            DiscardCards { amount } => return library::discard(state, ctx, *amount),
            ChooseCardFromTargetHandToDiscard => return library::choose_from_target_hand(state, ctx),
            MillTargetPlayer { amount } => library::mill_target(state, ctx, amount.value(x)),
            ShuffleIntoLibrary => ctx.to_library = true,
            ShuffleGraveyardIntoLibrary => library::shuffle_graveyard_into_library(state, ctx.controller),
            SearchLibraryForBasicLandToHand => return library::search_basic_land(state, ctx),
            ReorderTopCards { count } => return library::reorder_top(state, ctx, *count),

            // Graveyards
            ReturnTargetCardFromGraveyardToHand => graveyard::return_target_to_hand(state, ctx)?,
            ReturnCreatureFromGraveyardToBattlefield => return graveyard::offer_creature(state, ctx),
            ReturnArtifactFromGraveyardToHand => return graveyard::offer_artifact(state, ctx),
            ExileTargetGraveyardCards => graveyard::exile_targets(state, ctx),

            // Stack
            CounterTargetSpell => stack::counter(state, ctx)?,
            CopyTargetSpell => stack::copy(state, ctx)?,

            // Control
            GainControlOfTargetUntilEndOfTurn => control::gain_until_end_of_turn(state, ctx)?,

            // Prevention
            PreventDamageToTarget { amount } => prevention::shield_target(state, ctx, *amount),
            PreventNextDamage { amount } => prevention::next_damage(state, *amount),
            PreventAllCombatDamage => prevention::all_combat_damage(state),
            PreventDamageFromChosenColor => return prevention::choose_color(state, ctx),
            RedirectUnblockedCombatDamageToSelf => prevention::redirect_to_source(state, ctx),

            // Misc
            CreateTokens { count, token } => misc::create_tokens(state, ctx, *count, token),
            ExtraTurn => misc::extra_turn(state, ctx),
            AddMana { color, amount } => misc::add_mana(state, ctx, *color, *amount),
            ChooseColorForSource => return misc::choose_source_color(state, ctx),
            May(inner) => return Ok(misc::offer(state, ctx, inner)),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, EffectSlot};
    use crate::core::EngineConfig;
    use crate::interaction::PendingInput;
    use std::sync::Arc;

    fn spell_ctx(state: &mut GameState, def: CardDefinition) -> EffectContext {
        let p0 = PlayerId::new(0);
        let card = Card::new(state.alloc_id(), p0, Arc::new(def));
        let mut ctx = EffectContext::new(p0, card.clone(), None);
        ctx.spell = Some(card);
        ctx
    }

    /// Test that a spell goes to the graveyard after resolving.
    #[test]
    fn test_spell_goes_to_graveyard() {
        let mut state = GameState::new(EngineConfig::default());
        let def = CardDefinition::sorcery("Divination", "{2}{U}".parse().unwrap())
            .with_effect(EffectSlot::Spell, Effect::draw(2));
        let ctx = spell_ctx(&mut state, def);
        EffectResolver::run(&mut state, ctx, vec![Effect::gain_life(2)]).unwrap();
        assert_eq!(state.players[PlayerId::new(0)].graveyard.len(), 1);
        assert_eq!(state.players[PlayerId::new(0)].life, 22);
    }

    /// Test that a "may" suspends and resumes with the remaining effects.
    #[test]
    fn test_may_suspends_and_resumes() {
        let mut state = GameState::new(EngineConfig::default());
        let p0 = PlayerId::new(0);
        let def = CardDefinition::sorcery("Choice", "{1}".parse().unwrap());
        let ctx = spell_ctx(&mut state, def);
        let effects = vec![Effect::may(Effect::gain_life(3)), Effect::gain_life(1)];

        EffectResolver::run(&mut state, ctx, effects).unwrap();
        assert!(matches!(state.pending, Some(PendingInput::MayEffect { .. })));
        assert!(state.suspended.is_some());
        assert_eq!(state.players[p0].life, 20);

        state.pending = None;
        EffectResolver::resume_with(&mut state, Effect::gain_life(3)).unwrap();
        assert!(state.suspended.is_none());
        assert_eq!(state.players[p0].life, 24);
        assert_eq!(state.players[p0].graveyard.len(), 1);
    }

    /// Test that shuffle-into-library replaces the graveyard.
    #[test]
    fn test_shuffle_into_library() {
        let mut state = GameState::new(EngineConfig::default());
        let def = CardDefinition::sorcery("Beacon", "{3}{W}{W}".parse().unwrap());
        let ctx = spell_ctx(&mut state, def);
        EffectResolver::run(&mut state, ctx, vec![Effect::ShuffleIntoLibrary]).unwrap();
        let board = &state.players[PlayerId::new(0)];
        assert!(board.graveyard.is_empty());
        assert_eq!(board.library.len(), 1);
    }

    /// Test that an illegal target is skipped, not an error.
    #[test]
    fn test_missing_target_is_skipped() {
        let mut state = GameState::new(EngineConfig::default());
        let def = CardDefinition::instant("Shock", "{R}".parse().unwrap());
        let mut ctx = spell_ctx(&mut state, def);
        ctx.targets.push(None);
        EffectResolver::run(&mut state, ctx, vec![Effect::damage(2)]).unwrap();
        assert!(state.log.iter().all(|line| !line.contains("damage")));
    }
}
