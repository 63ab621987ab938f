//! Game state: the single arena owned by a match.
//!
//! ## GameState
//!
//! One `GameState` exists per match. Every operation receives it explicitly;
//! cross references between objects are `EntityId`s resolved through the
//! lookups below, never pointers.
//!
//! - Per player (`PlayerBoard`): life, library, hand, graveyard, exile,
//!   battlefield, mana pool, per-turn counters, auto-stops
//! - Shared: stack, step, active player, priority passes, the single
//!   awaiting-input marker, combat, prevention, trigger queues, RNG
//!
//! The player-facing game log is an `im::Vector` so snapshots can share it
//! without copying.

use std::collections::{BTreeSet, VecDeque};

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::EngineConfig;
use super::entity::EntityId;
use super::error::{EngineError, Result};
use super::mana::ManaPool;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use super::step::Step;
use crate::cards::{Card, ColorSet, Permanent};
use crate::combat::CombatState;
use crate::effects::{SuspendedResolution, Target};
use crate::interaction::PendingInput;
use crate::stack::{PriorityState, StackEntry};
use crate::triggers::TriggerQueue;
use crate::zones::Pile;

/// Whether the match is still being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    /// `winner` is `None` for a draw.
    Finished { winner: Option<PlayerId> },
    /// An engine invariant was violated; no further intents are accepted.
    Aborted,
}

/// Everything one player owns.
#[derive(Clone, Debug)]
pub struct PlayerBoard {
    pub life: i32,
    /// Top of library is index 0.
    pub library: Pile,
    pub hand: Pile,
    pub graveyard: Pile,
    pub exile: Pile,
    pub battlefield: Vec<Permanent>,
    pub mana_pool: ManaPool,
    /// Damage to this player to prevent.
    pub prevention_shield: i32,
    pub lands_played: u32,
    pub spells_cast: u32,
    pub auto_stops: BTreeSet<Step>,
    pub drew_from_empty: bool,
    /// Set by "loses the game" effects; checked with state-based actions.
    pub lost: bool,
}

impl PlayerBoard {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            life: config.starting_life,
            library: Pile::new(),
            hand: Pile::new(),
            graveyard: Pile::new(),
            exile: Pile::new(),
            battlefield: Vec::new(),
            mana_pool: ManaPool::new(),
            prevention_shield: 0,
            lands_played: 0,
            spells_cast: 0,
            auto_stops: config.default_auto_stops.iter().copied().collect(),
            drew_from_empty: false,
            lost: false,
        }
    }
}

/// Game-wide prevention and redirection, all lasting until end of turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreventionState {
    /// The next N damage dealt to anything is prevented.
    pub next_damage: i32,
    pub all_combat_damage: bool,
    /// Damage from sources of these colors is prevented.
    pub colors: ColorSet,
    /// Unblocked combat damage is dealt to this permanent instead.
    pub combat_redirect: Option<EntityId>,
}

/// How long a control change lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlDuration {
    EndOfTurn,
    /// While the given aura stays attached.
    WhileAttached(EntityId),
}

/// A permanent controlled by someone other than before.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlChange {
    pub original: PlayerId,
    pub duration: ControlDuration,
}

/// The root aggregate of one match.
#[derive(Clone, Debug)]
pub struct GameState {
    pub players: PlayerMap<PlayerBoard>,
    /// Top of stack is the last element.
    pub stack: Vec<StackEntry>,
    pub active_player: PlayerId,
    pub starting_player: PlayerId,
    pub step: Step,
    pub turn_number: u32,
    pub priority: PriorityState,
    /// When set, only the matching answer from the prompted player is accepted.
    pub pending: Option<PendingInput>,
    pub status: GameStatus,
    pub combat: CombatState,
    pub prevention: PreventionState,
    pub log: Vector<String>,
    pub extra_turns: VecDeque<PlayerId>,
    pub triggers: TriggerQueue,
    /// Effects left over when a resolution stopped for input.
    pub suspended: Option<SuspendedResolution>,
    pub end_of_combat_sacrifices: Vec<EntityId>,
    pub control_changes: FxHashMap<EntityId, ControlChange>,
    pub rng: GameRng,
    pub config: EngineConfig,
    next_entity: u32,
}

impl GameState {
    /// Create an empty game: no cards anywhere, turn 1, upkeep.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            players: PlayerMap::new(|_| PlayerBoard::new(&config)),
            stack: Vec::new(),
            active_player: PlayerId::new(0),
            starting_player: PlayerId::new(0),
            step: Step::FIRST,
            turn_number: 1,
            priority: PriorityState::default(),
            pending: None,
            status: GameStatus::Running,
            combat: CombatState::default(),
            prevention: PreventionState::default(),
            log: Vector::new(),
            extra_turns: VecDeque::new(),
            triggers: TriggerQueue::default(),
            suspended: None,
            end_of_combat_sacrifices: Vec::new(),
            control_changes: FxHashMap::default(),
            rng: GameRng::new(config.seed),
            config,
            next_entity: EntityId::FIRST,
        }
    }

    /// Allocate a fresh entity id.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    /// Append a player-facing log line.
    pub fn log_event(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(turn = self.turn_number, step = %self.step, "{message}");
        self.log.push_back(message);
    }

    #[must_use]
    pub fn defending_player(&self) -> PlayerId {
        self.active_player.opponent()
    }

    /// Active player if they have not passed, else the other player if they
    /// have not, else nobody.
    #[must_use]
    pub fn priority_holder(&self) -> Option<PlayerId> {
        self.priority.holder(self.active_player)
    }

    // === Permanents ===

    /// Controller and battlefield index of a permanent.
    #[must_use]
    pub fn locate_permanent(&self, id: EntityId) -> Option<(PlayerId, usize)> {
        self.players.iter().find_map(|(player, board)| {
            board
                .battlefield
                .iter()
                .position(|p| p.id == id)
                .map(|index| (player, index))
        })
    }

    #[must_use]
    pub fn permanent(&self, id: EntityId) -> Option<&Permanent> {
        self.all_permanents().find(|p| p.id == id)
    }

    pub fn permanent_mut(&mut self, id: EntityId) -> Option<&mut Permanent> {
        self.players
            .iter_mut()
            .flat_map(|(_, board)| board.battlefield.iter_mut())
            .find(|p| p.id == id)
    }

    /// Lookup that must succeed.
    pub fn require_permanent(&self, id: EntityId) -> Result<&Permanent> {
        self.permanent(id)
            .ok_or_else(|| EngineError::invariant(format!("permanent {id} is not on the battlefield")))
    }

    pub fn require_permanent_mut(&mut self, id: EntityId) -> Result<&mut Permanent> {
        self.permanent_mut(id)
            .ok_or_else(|| EngineError::invariant(format!("permanent {id} is not on the battlefield")))
    }

    /// A player's permanent by battlefield index.
    pub fn permanent_at(&self, player: PlayerId, index: usize) -> Result<&Permanent> {
        self.players[player]
            .battlefield
            .get(index)
            .ok_or(EngineError::InvalidIndex { what: "battlefield", index })
    }

    /// Every permanent, player 0's battlefield first.
    pub fn all_permanents(&self) -> impl Iterator<Item = &Permanent> {
        self.players.values().flat_map(|board| board.battlefield.iter())
    }

    #[must_use]
    pub fn permanent_ids(&self) -> Vec<EntityId> {
        self.all_permanents().map(|p| p.id).collect()
    }

    // === Cards elsewhere ===

    /// A card in any graveyard.
    #[must_use]
    pub fn graveyard_card(&self, id: EntityId) -> Option<&Card> {
        self.players.values().find_map(|board| board.graveyard.find(id))
    }

    #[must_use]
    pub fn stack_entry(&self, id: EntityId) -> Option<&StackEntry> {
        self.stack.iter().find(|e| e.id == id)
    }

    /// Human-readable description of a target.
    #[must_use]
    pub fn describe_target(&self, target: Target) -> String {
        match target {
            Target::Player(p) => p.to_string(),
            Target::Permanent(id) => self
                .permanent(id)
                .map_or_else(|| target.to_string(), |p| p.name().to_string()),
            Target::GraveyardCard(id) => self
                .graveyard_card(id)
                .map_or_else(|| target.to_string(), |c| c.name().to_string()),
            Target::Spell(id) => self
                .stack_entry(id)
                .map_or_else(|| target.to_string(), |e| e.description.clone()),
        }
    }

    // === Players ===

    pub fn gain_life(&mut self, player: PlayerId, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.players[player].life += amount;
        self.log_event(format!("{player} gains {amount} life."));
    }

    pub fn lose_life(&mut self, player: PlayerId, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.players[player].life -= amount;
        self.log_event(format!("{player} loses {amount} life."));
    }

    /// Empty every mana pool.
    pub fn drain_mana_pools(&mut self) {
        for (_, board) in self.players.iter_mut() {
            board.mana_pool.clear();
        }
    }

    /// End the game. Both players losing at once is a draw.
    pub fn finish(&mut self, winner: Option<PlayerId>) {
        if !self.is_running() {
            return;
        }
        self.status = GameStatus::Finished { winner };
        self.pending = None;
        match winner {
            Some(p) => self.log_event(format!("{p} wins the game.")),
            None => self.log_event("The game is a draw."),
        }
    }
}
