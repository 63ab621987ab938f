//! # duel-engine
//!
//! A server-authoritative rules engine for a two-player collectible card
//! game. It owns every legal state transition: turn and step sequencing,
//! priority, a LIFO stack for spells and abilities, combat damage,
//! continuous effects, and state-based actions. Players act only through
//! discrete [`Intent`]s; the engine validates, applies, and runs to the next
//! point where someone must decide.
//!
//! ## Design Principles
//!
//! 1. **One arena per match**: all state lives in [`GameState`] and is
//!    passed explicitly. Cross references are [`EntityId`]s, never pointers.
//!
//! 2. **Closed effect types**: one-shot and continuous effects are sum types
//!    resolved by exhaustive `match`. New cards add variants, not traits.
//!
//! 3. **Computed, never cached**: effective power, toughness and keywords
//!    are recomputed from the battlefield on every query.
//!
//! 4. **Explicit suspension**: a resolution that needs a player's choice
//!    stores its remaining effects and raises a single [`PendingInput`].
//!
//! ## Modules
//!
//! - `core`: Ids, players, state, mana, steps, configuration, errors, RNG, intents
//! - `cards`: Card definitions, cards, permanents, characteristics, registry
//! - `zones`: Ordered piles and movement between zones
//! - `statics`: Static Query Engine
//! - `effects`: Effects, targeting, and the effect resolver
//! - `triggers`: Triggered abilities
//! - `stack`: Stack entries, priority, resolution
//! - `combat`: Declarations and combat damage
//! - `rules`: State-based actions, turns, casting, intent dispatch
//! - `interaction`: Prompts and answers
//! - `game`: The per-match lock, snapshots, and broadcasting

pub mod cards;
pub mod combat;
pub mod core;
pub mod effects;
pub mod game;
pub mod interaction;
pub mod rules;
pub mod stack;
pub mod statics;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EngineError, EntityId, GameState, GameStatus, Intent, PlayerId, PlayerMap, Result, Step,
};

pub use crate::cards::{Card, CardDefinition, CardRegistry, Permanent};

pub use crate::effects::{Effect, StaticEffect, Target, TargetRequirement};

pub use crate::game::{Broadcaster, GameSnapshot, Match, MatchBuilder};

pub use crate::interaction::PendingInput;

pub use crate::rules::RulesEngine;
